use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use voxmeter_engine::render_report;
use voxmeter_runtime::{SessionWatcher, StreamEvent};
use voxmeter_types::TurnRecord;

use crate::output;

pub fn run(path: PathBuf, poll_ms: u64, color: bool) -> Result<()> {
    let watcher = SessionWatcher::new(path, Duration::from_millis(poll_ms))?;

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    // Client-side copy of the ledger so an interrupted watch can still
    // render whatever completed before the pipeline aborted.
    let mut completed: Vec<TurnRecord> = Vec::new();

    loop {
        if !running.load(Ordering::SeqCst) {
            eprintln!("Interrupted; rendering completed turns.");
            if let Some(report) = render_report(&completed) {
                output::print_report(&report, color);
            }
            break;
        }

        match watcher.receiver().recv_timeout(Duration::from_millis(200)) {
            Ok(StreamEvent::Attached { path }) => {
                eprintln!("Watching {}", path.display());
            }
            Ok(StreamEvent::TurnCompleted(turn)) => {
                println!("{}", output::format_turn_line(&turn));
                completed.push(turn);
            }
            Ok(StreamEvent::SessionEnded { report }) => {
                if let Some(report) = report {
                    output::print_report(&report, color);
                }
                break;
            }
            Ok(StreamEvent::Waiting { message }) => {
                eprintln!("{}", message);
            }
            Ok(StreamEvent::Error(message)) => {
                eprintln!("Watcher error: {}", message);
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                // Worker died; report what we have rather than nothing.
                if let Some(report) = render_report(&completed) {
                    output::print_report(&report, color);
                }
                break;
            }
        }
    }

    Ok(())
}

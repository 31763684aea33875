use anyhow::Result;
use notify::{Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Duration;
use tracing::debug;
use voxmeter_engine::{LatencyCorrelator, Submission, Transition};
use voxmeter_types::TurnRecord;

use crate::ingest;

/// Updates emitted while following a live event log.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// Now following this log file.
    Attached { path: PathBuf },
    /// A turn closed; here is its breakdown.
    TurnCompleted(TurnRecord),
    /// Terminal signal observed; `report` is the rendered summary table
    /// (None if no turn ever completed).
    SessionEnded { report: Option<String> },
    /// No log file to follow yet.
    Waiting { message: String },
    /// Non-fatal failure inside the watcher.
    Error(String),
}

/// Follows a growing JSONL event log and feeds a [`LatencyCorrelator`]
/// incrementally.
///
/// The correlator lives entirely inside the worker thread; consumers see
/// only `StreamEvent`s on the receiver. That keeps the single-writer
/// discipline the engine requires without any locking.
pub struct SessionWatcher {
    _watcher: PollWatcher,
    rx: Receiver<StreamEvent>,
}

impl SessionWatcher {
    /// Watch `target`: either an event-log file or a directory, in which
    /// case the most recently modified `*.jsonl` file inside it is followed
    /// and newly created logs take over (session rotation).
    pub fn new(target: PathBuf, poll_interval: Duration) -> Result<Self> {
        let (tx_out, rx_out) = channel();
        let (tx_fs, rx_fs) = channel();

        let mut tail = Tail::new();

        let watch_dir = if target.is_file() {
            tail.attach(target.clone(), &tx_out);
            target.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
        } else {
            match find_latest_log(&target) {
                Some(path) => tail.attach(path, &tx_out),
                None => {
                    let _ = tx_out.send(StreamEvent::Waiting {
                        message: format!(
                            "No event log found under {}. Waiting for one...",
                            target.display()
                        ),
                    });
                }
            }
            target.clone()
        };

        let config = notify::Config::default().with_poll_interval(poll_interval);

        let mut watcher = PollWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx_fs.send(event);
                }
            },
            config,
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        let tx_worker = tx_out.clone();
        std::thread::Builder::new()
            .name("voxmeter-watcher".to_string())
            .spawn(move || {
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    while let Ok(event) = rx_fs.recv() {
                        if let Err(e) = handle_fs_event(&event, &mut tail, &tx_worker) {
                            let _ = tx_worker.send(StreamEvent::Error(format!(
                                "File system event handling error: {}",
                                e
                            )));
                        }
                    }
                }));

                if let Err(panic_err) = result {
                    let panic_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                        s.to_string()
                    } else if let Some(s) = panic_err.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Worker thread panicked with unknown error".to_string()
                    };
                    let _ = tx_worker.send(StreamEvent::Error(format!(
                        "FATAL: Worker thread panicked: {}",
                        panic_msg
                    )));
                }
            })?;

        Ok(Self {
            _watcher: watcher,
            rx: rx_out,
        })
    }

    pub fn receiver(&self) -> &Receiver<StreamEvent> {
        &self.rx
    }
}

/// Per-file correlation state owned by the worker thread.
struct Tail {
    path: Option<PathBuf>,
    correlator: LatencyCorrelator,
    consumed: usize,
}

impl Tail {
    fn new() -> Self {
        Self {
            path: None,
            correlator: LatencyCorrelator::new(),
            consumed: 0,
        }
    }

    /// Switch to `path` with a fresh correlator and replay its current
    /// contents.
    fn attach(&mut self, path: PathBuf, tx: &Sender<StreamEvent>) {
        debug!("Attaching to event log {}", path.display());
        self.path = Some(path.clone());
        self.correlator = LatencyCorrelator::new();
        self.consumed = 0;

        let _ = tx.send(StreamEvent::Attached { path });
        self.drain(tx);
    }

    /// Read the log, submit events past the already-consumed prefix, and
    /// emit an update per closed turn.
    fn drain(&mut self, tx: &Sender<StreamEvent>) {
        let Some(path) = self.path.clone() else {
            return;
        };

        let report = match ingest::read_events(&path) {
            Ok(report) => report,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
                return;
            }
        };

        for event in report.events.iter().skip(self.consumed) {
            match self.correlator.submit(event) {
                Submission::Applied(Transition::TurnClosed(_)) => {
                    if let Some(turn) = self.correlator.ledger().last() {
                        let _ = tx.send(StreamEvent::TurnCompleted(turn.clone()));
                    }
                }
                Submission::Applied(Transition::SessionEnded) => {
                    let _ = tx.send(StreamEvent::SessionEnded {
                        report: self.correlator.render_report(),
                    });
                }
                _ => {}
            }
        }
        self.consumed = report.events.len();
    }
}

fn handle_fs_event(event: &Event, tail: &mut Tail, tx: &Sender<StreamEvent>) -> Result<()> {
    match event.kind {
        EventKind::Create(_) => {
            for path in &event.paths {
                if !is_event_log(path) {
                    continue;
                }

                // A newly created log supersedes the current one (the host
                // started a fresh call session).
                let should_switch = match &tail.path {
                    Some(current) => {
                        let new_time = std::fs::metadata(path)?.modified()?;
                        let current_time = std::fs::metadata(current)?.modified()?;
                        new_time >= current_time
                    }
                    None => true,
                };

                if should_switch {
                    tail.attach(path.clone(), tx);
                }
            }
        }
        EventKind::Modify(_) => {
            for path in &event.paths {
                if tail.path.is_none() && is_event_log(path) {
                    tail.attach(path.clone(), tx);
                } else if Some(path) == tail.path.as_ref() {
                    tail.drain(tx);
                }
            }
        }
        _ => {}
    }

    Ok(())
}

fn is_event_log(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

/// Most recently modified event log under `dir`, if any.
fn find_latest_log(dir: &Path) -> Option<PathBuf> {
    let mut newest: Option<(PathBuf, std::time::SystemTime)> = None;

    for entry in walkdir::WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || !is_event_log(path) {
            continue;
        }

        if let Ok(metadata) = path.metadata()
            && let Ok(modified) = metadata.modified()
        {
            let is_newer = newest
                .as_ref()
                .map(|(_, time)| modified > *time)
                .unwrap_or(true);
            if is_newer {
                newest = Some((path.to_path_buf(), modified));
            }
        }
    }

    newest.map(|(path, _)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_event_log() {
        assert!(is_event_log(Path::new("/tmp/session.jsonl")));
        assert!(!is_event_log(Path::new("/tmp/session.json")));
        assert!(!is_event_log(Path::new("/tmp/session")));
    }

    #[test]
    fn test_find_latest_log_picks_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.jsonl");
        let new = dir.path().join("new.jsonl");

        std::fs::write(&old, "").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        std::fs::write(&new, "").unwrap();

        assert_eq!(find_latest_log(dir.path()), Some(new));
    }

    #[test]
    fn test_find_latest_log_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_latest_log(dir.path()), None);
    }

    #[test]
    fn test_watcher_replays_existing_log_and_follows_appends() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("call.jsonl");
        let mut file = std::fs::File::create(&log).unwrap();
        writeln!(
            file,
            r#"{{"id":"00000000-0000-0000-0000-000000000001","timestamp":"2026-01-01T00:00:00Z","type":"user_speech_stopped"}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"id":"00000000-0000-0000-0000-000000000002","timestamp":"2026-01-01T00:00:01.600Z","type":"bot_speech_started"}}"#
        )
        .unwrap();
        file.sync_all().unwrap();

        let watcher = SessionWatcher::new(log.clone(), Duration::from_millis(100)).unwrap();
        let rx = watcher.receiver();

        // Attached, then the replayed turn.
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            StreamEvent::Attached { path } => assert_eq!(path, log),
            other => panic!("expected Attached, got {:?}", other),
        }
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            StreamEvent::TurnCompleted(turn) => {
                assert_eq!(turn.turn_number, 1);
                assert_eq!(turn.total_wall_clock, Some(1.6));
            }
            other => panic!("expected TurnCompleted, got {:?}", other),
        }

        // Append a terminal signal; the watcher must pick it up.
        writeln!(
            file,
            r#"{{"id":"00000000-0000-0000-0000-000000000003","timestamp":"2026-01-01T00:00:05Z","type":"session_ended"}}"#
        )
        .unwrap();
        file.sync_all().unwrap();

        match rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            StreamEvent::SessionEnded { report } => {
                assert!(report.unwrap().contains("LATENCY BREAKDOWN"));
            }
            other => panic!("expected SessionEnded, got {:?}", other),
        }
    }
}

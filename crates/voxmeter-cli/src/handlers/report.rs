use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use voxmeter_engine::{correlate, render_report, session_stats};
use voxmeter_runtime::read_events;
use voxmeter_types::{SessionStats, TurnRecord};

use crate::output;
use crate::types::ReportFormat;

#[derive(Serialize)]
struct LedgerView {
    turns: Vec<TurnRecord>,
    stats: SessionStats,
}

pub fn run(log: &Path, format: ReportFormat, color: bool) -> Result<()> {
    let ingest = read_events(log)?;
    let turns = correlate(&ingest.events);

    match format {
        ReportFormat::Plain => {
            // An empty ledger prints nothing; that is a valid session, not
            // an error.
            if let Some(report) = render_report(&turns) {
                output::print_report(&report, color);
            }
        }
        ReportFormat::Json => {
            let view = LedgerView {
                stats: session_stats(&turns),
                turns,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(())
}

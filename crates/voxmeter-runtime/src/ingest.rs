use std::path::Path;

use tracing::warn;
use voxmeter_types::PipelineEvent;

use crate::Result;

/// Outcome of reading one event log.
///
/// Malformed lines are the producer's contract violation, not ours: they are
/// reported and skipped so one bad line never takes down ingestion of the
/// rest of the session.
#[derive(Debug)]
pub struct IngestReport {
    /// Events parsed, in file order.
    pub events: Vec<PipelineEvent>,
    /// Number of lines that failed to parse.
    pub skipped: usize,
}

/// Parse a JSONL event log. Blank lines are ignored; malformed lines are
/// logged at `warn` and counted in `skipped`.
pub fn read_events(path: &Path) -> Result<IngestReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_lines(path, &content))
}

fn parse_lines(path: &Path, content: &str) -> IngestReport {
    let mut events = Vec::new();
    let mut skipped = 0;

    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PipelineEvent>(line) {
            Ok(event) => events.push(event),
            Err(err) => {
                skipped += 1;
                warn!(
                    "Skipping malformed event at {}:{}: {}",
                    path.display(),
                    line_number + 1,
                    err
                );
            }
        }
    }

    IngestReport { events, skipped }
}

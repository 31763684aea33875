// Engine module - Core correlation logic (dedup, turn tracking, reporting)
// This layer sits between the raw event stream (types) and host presentation

pub mod correlator;
pub mod dedup;
pub mod report;
mod tracker;

pub use correlator::{EngineStats, LatencyCorrelator, Submission};
pub use dedup::SeenEvents;
pub use report::render_report;
pub use tracker::{Transition, TurnTracker};

use voxmeter_types::{PipelineEvent, SessionStats, TurnRecord};

// Façade API - Stable public interface for host layers
// Hosts should use these functions instead of directly accessing internal modules

/// Correlate a recorded event stream into completed turn records.
///
/// Batch counterpart of feeding a [`LatencyCorrelator`] one event at a time;
/// tolerates duplicates, reordering, and the absence of a terminal signal.
pub fn correlate(events: &[PipelineEvent]) -> Vec<TurnRecord> {
    let mut correlator = LatencyCorrelator::new();
    for event in events {
        correlator.submit(event);
    }
    correlator.into_ledger()
}

/// Aggregate statistics over a completed-turn ledger.
pub fn session_stats(turns: &[TurnRecord]) -> SessionStats {
    let wall_clocks: Vec<f64> = turns.iter().filter_map(|t| t.total_wall_clock).collect();
    let avg_wall_clock = if wall_clocks.is_empty() {
        None
    } else {
        Some(wall_clocks.iter().sum::<f64>() / wall_clocks.len() as f64)
    };

    SessionStats {
        total_turns: turns.len(),
        avg_wall_clock,
    }
}

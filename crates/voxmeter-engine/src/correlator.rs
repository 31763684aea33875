use serde::Serialize;
use voxmeter_types::{PipelineEvent, TurnRecord};

use crate::dedup::SeenEvents;
use crate::report;
use crate::tracker::{Transition, TurnTracker};

/// What became of one submitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Event advanced the tracker; carries the resulting transition.
    Applied(Transition),
    /// Identity token already seen; dropped with no effect.
    Duplicate,
    /// Session already ended; dropped with no effect.
    Terminated,
}

/// Counters over one session's event stream. Purely observational; none of
/// these influence correlation.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EngineStats {
    pub events_submitted: u64,
    pub duplicates_dropped: u64,
    pub metrics_routed: u64,
    pub metrics_late: u64,
    pub metrics_buffered: u64,
    pub metrics_dropped: u64,
    pub turns_completed: u64,
}

/// The correlation engine: dedup check, then route, then state mutation,
/// one event at a time.
///
/// Single logical writer by contract: `submit` completes synchronously and
/// never blocks, performs I/O, or fails. Hosts with concurrent delivery
/// paths serialize events through one queue and keep the correlator on the
/// consuming side.
#[derive(Debug, Default)]
pub struct LatencyCorrelator {
    seen: SeenEvents,
    tracker: TurnTracker,
    stats: EngineStats,
}

impl LatencyCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event through dedup → route → mutate.
    pub fn submit(&mut self, event: &PipelineEvent) -> Submission {
        self.stats.events_submitted += 1;

        if !self.seen.first_sighting(event.id) {
            self.stats.duplicates_dropped += 1;
            return Submission::Duplicate;
        }

        if self.tracker.is_ended() {
            return Submission::Terminated;
        }

        let transition = self.tracker.apply(event.timestamp, &event.payload);
        match transition {
            Transition::MetricRouted => self.stats.metrics_routed += 1,
            Transition::MetricLate => self.stats.metrics_late += 1,
            Transition::MetricBuffered => self.stats.metrics_buffered += 1,
            Transition::MetricDropped => self.stats.metrics_dropped += 1,
            Transition::TurnClosed(_) => self.stats.turns_completed += 1,
            _ => {}
        }

        Submission::Applied(transition)
    }

    /// Completed turns so far, in close order.
    pub fn ledger(&self) -> &[TurnRecord] {
        self.tracker.ledger()
    }

    pub fn into_ledger(self) -> Vec<TurnRecord> {
        self.tracker.into_ledger()
    }

    /// Render the latency table over whatever has completed so far.
    ///
    /// Callable at any point, with or without a terminal signal, so a host
    /// aborting mid-session can still report. Read-only and idempotent.
    pub fn render_report(&self) -> Option<String> {
        report::render_report(self.ledger())
    }

    pub fn is_ended(&self) -> bool {
        self.tracker.is_ended()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

use chrono::{DateTime, Utc};
use voxmeter_types::{EventPayload, MetricData, MetricPayload, Stage, TurnRecord};

/// Outcome of applying one event to the tracker.
///
/// Lets hosts stream results (print a breakdown the moment a turn closes)
/// without polling the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Event matched no meaningful transition in the current state.
    Ignored,
    /// A new turn opened and the wall-clock anchor was set.
    TurnOpened(u32),
    /// User resumed speaking before the bot replied; the anchor was cleared
    /// but the open turn and its metrics are preserved.
    AnchorCleared(u32),
    /// User stopped speaking again on a still-open turn; the same turn's
    /// anchor was reset.
    Reanchored(u32),
    /// Metric sample routed into the open turn.
    MetricRouted,
    /// Metric sample applied to the most-recently-closed turn.
    MetricLate,
    /// Metric sample arrived before any turn existed; held in the pending
    /// buffer for the first turn.
    MetricBuffered,
    /// Metric sample matched no routing rule (unknown stage/kind pairing or
    /// an incomplete turn decision) and was dropped.
    MetricDropped,
    /// The open turn was closed with a wall-clock total.
    TurnClosed(u32),
    /// Terminal signal observed.
    SessionEnded,
}

/// State machine that owns the notion of "current turn".
///
/// Opens a turn on user-stopped-speaking, closes it on bot-started-speaking,
/// and routes metric samples to the open turn, the most-recently-closed turn
/// (late samples such as usage totals), or a pending buffer (samples that
/// precede the very first turn). Every transition is total: unexpected event
/// sequences degrade to `Ignored`/`MetricDropped`, never to a panic or error,
/// so the engine can never destabilize the pipeline it observes.
#[derive(Debug, Default)]
pub struct TurnTracker {
    turn_count: u32,
    anchor: Option<DateTime<Utc>>,
    current: Option<TurnRecord>,
    completed: Vec<TurnRecord>,
    // Whether completed.last() may still receive late samples. Closes as
    // soon as the next turn opens.
    late_window_open: bool,
    pending: Vec<MetricPayload>,
    ended: bool,
}

impl TurnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event. Total over every (state, event) combination.
    pub fn apply(&mut self, timestamp: DateTime<Utc>, payload: &EventPayload) -> Transition {
        match payload {
            EventPayload::UserSpeechStarted => self.on_user_started(),
            EventPayload::UserSpeechStopped => self.on_user_stopped(timestamp),
            EventPayload::Metric(metric) => self.on_metric(metric),
            EventPayload::BotSpeechStarted => self.on_bot_started(timestamp),
            EventPayload::SessionEnded => {
                self.ended = true;
                Transition::SessionEnded
            }
        }
    }

    fn on_user_started(&mut self) -> Transition {
        // A false start: the user is still deciding. Drop the anchor so the
        // next stop re-times the span, but keep the turn and its metrics.
        match (&self.current, self.anchor.take()) {
            (Some(turn), Some(_)) => Transition::AnchorCleared(turn.turn_number),
            _ => Transition::Ignored,
        }
    }

    fn on_user_stopped(&mut self, timestamp: DateTime<Utc>) -> Transition {
        self.anchor = Some(timestamp);

        if let Some(turn) = &self.current {
            // Same still-open turn; only the timer restarts.
            return Transition::Reanchored(turn.turn_number);
        }

        self.turn_count += 1;
        let mut turn = TurnRecord::new(self.turn_count);

        // Samples that beat the turn boundary (e.g. STT TTFB) were parked in
        // the pending buffer; drain them in arrival order.
        for metric in self.pending.drain(..) {
            route_metric(&mut turn, &metric);
        }

        self.current = Some(turn);
        self.late_window_open = false;
        Transition::TurnOpened(self.turn_count)
    }

    fn on_metric(&mut self, metric: &MetricPayload) -> Transition {
        if let Some(turn) = self.current.as_mut() {
            return if route_metric(turn, metric) {
                Transition::MetricRouted
            } else {
                Transition::MetricDropped
            };
        }

        if self.late_window_open {
            // Samples that complete slightly after the bot starts speaking,
            // e.g. usage totals tallied at end of generation.
            if let Some(last) = self.completed.last_mut() {
                return if route_metric(last, metric) {
                    Transition::MetricLate
                } else {
                    Transition::MetricDropped
                };
            }
        }

        self.pending.push(metric.clone());
        Transition::MetricBuffered
    }

    fn on_bot_started(&mut self, timestamp: DateTime<Utc>) -> Transition {
        match (self.anchor.take(), self.current.take()) {
            (Some(anchor), Some(mut turn)) => {
                let elapsed = timestamp.signed_duration_since(anchor);
                turn.total_wall_clock = Some(elapsed.num_milliseconds() as f64 / 1000.0);

                let turn_number = turn.turn_number;
                self.completed.push(turn);
                self.late_window_open = true;
                Transition::TurnClosed(turn_number)
            }
            (anchor, current) => {
                // Spontaneous bot speech (idle prompt, greeting): no anchored
                // span exists, so nothing closes and no duration is invented.
                self.anchor = anchor;
                self.current = current;
                Transition::Ignored
            }
        }
    }

    /// Completed turns, in close order.
    pub fn ledger(&self) -> &[TurnRecord] {
        &self.completed
    }

    pub fn into_ledger(self) -> Vec<TurnRecord> {
        self.completed
    }

    /// Whether the terminal signal has been observed.
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether a turn is currently open.
    pub fn has_open_turn(&self) -> bool {
        self.current.is_some()
    }
}

/// Route one metric sample to its field on the given turn (overwrite, not
/// accumulate). Returns false for pairings with no routing rule; unknown
/// combinations are dropped rather than refused so new producer stages never
/// break the tracker.
fn route_metric(turn: &mut TurnRecord, metric: &MetricPayload) -> bool {
    match (metric.stage, &metric.data) {
        (Stage::Stt, MetricData::Ttfb { seconds }) => {
            turn.stt_ttfb = Some(*seconds);
            true
        }
        (Stage::Llm, MetricData::Ttfb { seconds }) => {
            turn.llm_ttfb = Some(*seconds);
            true
        }
        (Stage::Tts, MetricData::Ttfb { seconds }) => {
            turn.tts_ttfb = Some(*seconds);
            true
        }
        (
            Stage::TurnDetector,
            MetricData::TurnDecision {
                e2e_ms,
                is_complete,
            },
        ) => {
            // Intermediate decisions are not final timings.
            if *is_complete {
                turn.turn_detector_ms = Some(*e2e_ms);
                true
            } else {
                false
            }
        }
        (
            Stage::Llm,
            MetricData::LlmUsage {
                prompt_tokens,
                completion_tokens,
            },
        ) => {
            turn.llm_prompt_tokens = Some(*prompt_tokens);
            turn.llm_completion_tokens = Some(*completion_tokens);
            true
        }
        (Stage::Tts, MetricData::TtsUsage { characters }) => {
            turn.tts_characters = Some(*characters);
            true
        }
        _ => false,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metric::MetricPayload;

// NOTE: Schema Design Goals
//
// 1. Delivery tolerance: the producing pipeline observes each logical event at
//    multiple points, so every event carries a unique identity token and the
//    consumer deduplicates by id, never by payload equality.
// 2. Determinism: all durations are derived from event timestamps, never from
//    a clock read at consumption time. A recorded log replays to the exact
//    same ledger and report.
// 3. Weak ordering: events for adjacent turns interleave. Correlation state
//    (open turn, late-metric window, pending buffer) lives in the engine, not
//    in the schema; the schema stays a flat append-only stream.

/// Single event observed on the pipeline's delivery path.
/// Maps 1:1 to one line of a JSONL event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineEvent {
    /// Unique event identity token. Re-deliveries of the same logical event
    /// carry the same id.
    pub id: Uuid,

    /// When the producing stage emitted the event (UTC).
    pub timestamp: DateTime<Utc>,

    /// Event kind and content (flattened enum).
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl PipelineEvent {
    pub fn new(timestamp: DateTime<Utc>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            payload,
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    /// Voice activity: the user began speaking.
    UserSpeechStarted,

    /// Voice activity: the user stopped speaking. This is the turn trigger
    /// and the wall-clock anchor for the user→bot response span.
    UserSpeechStopped,

    /// The bot's first audio went out. Closes the current turn.
    BotSpeechStarted,

    /// Timing or usage sample from one pipeline stage.
    ///
    /// May arrive before the turn it belongs to opens (e.g. STT first-byte
    /// latency) or after it closes (e.g. LLM usage totals).
    Metric(MetricPayload),

    /// Terminal signal: the call ended or the pipeline was cancelled.
    SessionEnded,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::{MetricData, Stage};
    use chrono::Utc;

    #[test]
    fn test_serialization() {
        let event = PipelineEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload: EventPayload::Metric(MetricPayload {
                stage: Stage::Stt,
                data: MetricData::Ttfb { seconds: 0.3 },
            }),
        };

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: PipelineEvent = serde_json::from_str(&json).unwrap();

        match deserialized.payload {
            EventPayload::Metric(m) => {
                assert_eq!(m.stage, Stage::Stt);
                assert_eq!(m.data, MetricData::Ttfb { seconds: 0.3 });
            }
            _ => panic!("Wrong payload type"),
        }
    }

    #[test]
    fn test_boundary_events_round_trip() {
        for payload in [
            EventPayload::UserSpeechStarted,
            EventPayload::UserSpeechStopped,
            EventPayload::BotSpeechStarted,
            EventPayload::SessionEnded,
        ] {
            let event = PipelineEvent::new(Utc::now(), payload.clone());
            let json = serde_json::to_string(&event).unwrap();
            let back: PipelineEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back.payload, payload);
            assert_eq!(back.id, event.id);
        }
    }

    #[test]
    fn test_wire_tags_are_snake_case() {
        let event = PipelineEvent::new(Utc::now(), EventPayload::UserSpeechStopped);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"user_speech_stopped\""));
    }
}

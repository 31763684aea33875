use serde::{Deserialize, Serialize};

/// Latency breakdown for one completed conversational turn.
///
/// Every field except the sequence number is optional: a stage that emitted
/// no sample for this turn simply leaves its slot empty, and the report
/// renders a placeholder. Fields are overwrite-on-arrival; one sample per
/// stage per turn is the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based turn sequence number.
    pub turn_number: u32,

    /// STT first-byte latency in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stt_ttfb: Option<f64>,

    /// Turn-detector end-to-end decision time in milliseconds.
    /// Only populated by samples flagged as a complete decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_detector_ms: Option<f64>,

    /// LLM first-byte latency in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_ttfb: Option<f64>,

    /// TTS first-byte latency in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_ttfb: Option<f64>,

    /// Wall-clock span from user-stopped-speaking to bot-started-speaking,
    /// in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_wall_clock: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_prompt_tokens: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_completion_tokens: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_characters: Option<u64>,
}

impl TurnRecord {
    pub fn new(turn_number: u32) -> Self {
        Self {
            turn_number,
            stt_ttfb: None,
            turn_detector_ms: None,
            llm_ttfb: None,
            tts_ttfb: None,
            total_wall_clock: None,
            llm_prompt_tokens: None,
            llm_completion_tokens: None,
            tts_characters: None,
        }
    }
}

/// Aggregated statistics over one session's completed turns.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionStats {
    /// Number of completed turns.
    pub total_turns: usize,

    /// Mean wall-clock latency in seconds, over turns where it is present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_wall_clock: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_not_serialized() {
        let record = TurnRecord::new(1);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, "{\"turn_number\":1}");
    }

    #[test]
    fn test_round_trip_with_fields() {
        let mut record = TurnRecord::new(3);
        record.stt_ttfb = Some(0.21);
        record.llm_prompt_tokens = Some(900);
        record.llm_completion_tokens = Some(41);

        let json = serde_json::to_string(&record).unwrap();
        let back: TurnRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}

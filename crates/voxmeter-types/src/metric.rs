use serde::{Deserialize, Serialize};

/// Pipeline stage a metric sample originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Speech-to-text transcription.
    Stt,
    /// End-of-utterance decision model.
    TurnDetector,
    /// Language model inference.
    Llm,
    /// Text-to-speech synthesis.
    Tts,
}

/// One timing or usage sample, attributed to a single stage.
///
/// Not every stage/kind combination is meaningful (a TTFB sample from the
/// turn detector, say, or usage from STT). The engine routes the meaningful
/// combinations and drops the rest; unknown combinations must never be a
/// parse error, so stage and kind are independent axes here rather than one
/// flat enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPayload {
    pub stage: Stage,

    #[serde(flatten)]
    pub data: MetricData,
}

/// Sample content, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricData {
    /// Time from a stage's work beginning to its first output unit.
    Ttfb { seconds: f64 },

    /// End-of-utterance decision timing. `is_complete` distinguishes a final
    /// decision from an intermediate one; only final decisions are recorded.
    TurnDecision { e2e_ms: f64, is_complete: bool },

    /// Token counts for one LLM generation.
    LlmUsage {
        prompt_tokens: u64,
        completion_tokens: u64,
    },

    /// Character count for one TTS synthesis.
    TtsUsage { characters: u64 },
}

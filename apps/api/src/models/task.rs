//! Task kinds, generation options, and the model request/response pair.

use serde::{Deserialize, Serialize};

/// The category of generation request. Determines the prompt template and
/// the response schema the parser expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    TailorResume,
    CoverLetter,
    AnswerQuestions,
}

impl TaskKind {
    /// Stable label used in fingerprints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::TailorResume => "tailor_resume",
            TaskKind::CoverLetter => "cover_letter",
            TaskKind::AnswerQuestions => "answer_questions",
        }
    }
}

/// Generation parameters embedded in the model request. Defaults match the
/// original service's settings for the flash-class model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    /// Fixed-point temperature in hundredths (e.g. 40 = 0.40) so the value
    /// participates in fingerprinting without float-equality concerns.
    pub temperature_hundredths: u16,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        GenerationOptions {
            max_output_tokens: 4096,
            temperature_hundredths: 40,
        }
    }
}

impl GenerationOptions {
    pub fn temperature(&self) -> f32 {
        f32::from(self.temperature_hundredths) / 100.0
    }
}

/// A fully built model request. Pure value: identical inputs to the Prompt
/// Builder produce a byte-identical `ModelRequest`, which is what makes
/// request fingerprinting stable.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub task: TaskKind,
    pub prompt: String,
    pub options: GenerationOptions,
}

/// What the external model hands back for one attempt. Transient; never
/// persisted beyond the request lifecycle.
#[derive(Debug, Clone)]
pub enum ModelResponse {
    Text(String),
    Failure(ModelFailure),
}

/// Typed failure from a single model attempt. The gateway's retry policy
/// keys off the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelFailure {
    /// Timeout, rate limit, or 5xx-equivalent. Retried with backoff.
    Transient { reason: String },
    /// Malformed request, bad credentials, or content-policy rejection.
    /// Never retried.
    Permanent { reason: String },
}

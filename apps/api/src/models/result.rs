//! Structured generation results and the terminal rendered artifact.
//!
//! A `TailoredResult` is well-formed only if every required field for its
//! task kind is present and non-empty. The Response Parser is the sole
//! writer enforcing that invariant — nothing downstream re-validates.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::models::resume::ResumeSection;

/// Task-specific structured payload. Produced once per request by the
/// Response Parser, consumed by the Render Engine, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TailoredResult {
    Resume(TailoredResume),
    CoverLetter(CoverLetter),
    Answers(AnswerSheet),
}

/// Revised resume: same section ids as the input, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TailoredResume {
    pub sections: Vec<ResumeSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverLetter {
    pub greeting: String,
    pub body_paragraphs: Vec<String>,
    pub closing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub answers: Vec<AnswerItem>,
}

/// One question/answer pair, in the order the questions were submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerItem {
    pub question: String,
    pub answer: String,
}

/// Supported output formats. Closed set, validated at the orchestrator
/// boundary before rendering begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Structured,
    Text,
    Document,
}

impl OutputFormat {
    /// Stable label used in fingerprints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Structured => "structured",
            OutputFormat::Text => "text",
            OutputFormat::Document => "document",
        }
    }
}

/// Terminal artifact of the pipeline, owned by the caller after return.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub format: OutputFormat,
    pub payload: Bytes,
}

impl RenderedOutput {
    pub fn content_type(&self) -> &'static str {
        match self.format {
            OutputFormat::Structured => "application/json",
            OutputFormat::Text => "text/plain; charset=utf-8",
            OutputFormat::Document => "text/plain; charset=utf-8",
        }
    }
}

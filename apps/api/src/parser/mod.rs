//! Response Parser — validates and decodes raw model output into a
//! [`TailoredResult`].
//!
//! The prompt templates instruct the model to emit a specific JSON shape,
//! but nothing here assumes that was honored: fences are stripped, the JSON
//! is decoded defensively, and every task-specific invariant is checked.
//! On any violation the parser returns a `PARSE_ERROR` carrying the reason
//! and a snippet of the offending output — it never truncates or fabricates
//! missing fields. This module is the sole writer of the well-formedness
//! invariant on `TailoredResult`.

use serde::Deserialize;

use crate::config::ValidationConfig;
use crate::errors::AppError;
use crate::models::result::{AnswerItem, AnswerSheet, CoverLetter, TailoredResult, TailoredResume};
use crate::models::resume::{Resume, ResumeSection};
use crate::models::task::TaskKind;

/// Max chars of raw model output echoed back in a parse error.
const SNIPPET_CAP: usize = 240;

/// Everything validation needs beyond the raw text: which task the output
/// is for, the input section ids, the input questions, and the configured
/// thresholds.
#[derive(Debug, Clone)]
pub struct ParseExpectation {
    pub task: TaskKind,
    pub section_ids: Vec<String>,
    pub questions: Vec<String>,
    pub cover_letter_min_body_chars: usize,
}

impl ParseExpectation {
    pub fn for_request(
        task: TaskKind,
        resume: &Resume,
        questions: &[String],
        validation: &ValidationConfig,
    ) -> Self {
        ParseExpectation {
            task,
            section_ids: resume.section_ids().iter().map(|s| s.to_string()).collect(),
            questions: questions.to_vec(),
            cover_letter_min_body_chars: validation.cover_letter_min_body_chars,
        }
    }
}

/// Shape the tailoring prompt asks for. Decoded here, then promoted to
/// `TailoredResume` only after validation.
#[derive(Debug, Deserialize)]
struct RawTailoredResume {
    sections: Vec<ResumeSection>,
}

#[derive(Debug, Deserialize)]
struct RawCoverLetter {
    greeting: String,
    body_paragraphs: Vec<String>,
    closing: String,
}

#[derive(Debug, Deserialize)]
struct RawAnswerSheet {
    answers: Vec<RawAnswer>,
}

#[derive(Debug, Deserialize)]
struct RawAnswer {
    #[serde(default)]
    #[allow(dead_code)]
    question: String,
    answer: String,
}

/// Parses one raw model response according to the expectation.
pub fn parse(raw: &str, expectation: &ParseExpectation) -> Result<TailoredResult, AppError> {
    let text = strip_json_fences(raw);

    match expectation.task {
        TaskKind::TailorResume => parse_tailored_resume(text, expectation, raw),
        TaskKind::CoverLetter => parse_cover_letter(text, expectation, raw),
        TaskKind::AnswerQuestions => parse_answers(text, expectation, raw),
    }
}

fn parse_tailored_resume(
    text: &str,
    expectation: &ParseExpectation,
    raw: &str,
) -> Result<TailoredResult, AppError> {
    let decoded: RawTailoredResume = decode(text, raw)?;

    let got_ids: Vec<&str> = decoded.sections.iter().map(|s| s.id.as_str()).collect();
    let want_ids: Vec<&str> = expectation.section_ids.iter().map(String::as_str).collect();
    if got_ids != want_ids {
        return Err(parse_error(
            format!("section ids mismatch: expected {want_ids:?}, got {got_ids:?}"),
            raw,
        ));
    }

    for section in &decoded.sections {
        if section.entries.is_empty() || section.entries.iter().all(|e| e.is_blank()) {
            return Err(parse_error(
                format!("section '{}' came back empty", section.id),
                raw,
            ));
        }
    }

    Ok(TailoredResult::Resume(TailoredResume {
        sections: decoded.sections,
    }))
}

fn parse_cover_letter(
    text: &str,
    expectation: &ParseExpectation,
    raw: &str,
) -> Result<TailoredResult, AppError> {
    let decoded: RawCoverLetter = decode(text, raw)?;

    if decoded.greeting.trim().is_empty() {
        return Err(parse_error("cover letter greeting is empty".into(), raw));
    }
    if decoded.closing.trim().is_empty() {
        return Err(parse_error("cover letter closing is empty".into(), raw));
    }

    let paragraphs: Vec<String> = decoded
        .body_paragraphs
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let body_len: usize = paragraphs.iter().map(|p| p.chars().count()).sum();
    if paragraphs.is_empty() || body_len < expectation.cover_letter_min_body_chars {
        return Err(parse_error(
            format!(
                "cover letter body too short: {body_len} chars, need {}",
                expectation.cover_letter_min_body_chars
            ),
            raw,
        ));
    }

    Ok(TailoredResult::CoverLetter(CoverLetter {
        greeting: decoded.greeting.trim().to_string(),
        body_paragraphs: paragraphs,
        closing: decoded.closing.trim().to_string(),
    }))
}

fn parse_answers(
    text: &str,
    expectation: &ParseExpectation,
    raw: &str,
) -> Result<TailoredResult, AppError> {
    let decoded: RawAnswerSheet = decode(text, raw)?;

    if decoded.answers.len() != expectation.questions.len() {
        return Err(parse_error(
            format!(
                "expected {} answers, got {}",
                expectation.questions.len(),
                decoded.answers.len()
            ),
            raw,
        ));
    }

    let mut answers = Vec::with_capacity(decoded.answers.len());
    for (i, (question, raw_answer)) in expectation
        .questions
        .iter()
        .zip(decoded.answers)
        .enumerate()
    {
        let answer = raw_answer.answer.trim().to_string();
        if answer.is_empty() {
            return Err(parse_error(format!("answer {} is empty", i + 1), raw));
        }
        // The input question text is authoritative; positional pairing is
        // the order guarantee.
        answers.push(AnswerItem {
            question: question.clone(),
            answer,
        });
    }

    Ok(TailoredResult::Answers(AnswerSheet { answers }))
}

fn decode<'a, T: Deserialize<'a>>(text: &'a str, raw: &str) -> Result<T, AppError> {
    serde_json::from_str(text).map_err(|e| parse_error(format!("invalid JSON: {e}"), raw))
}

fn parse_error(reason: String, raw: &str) -> AppError {
    AppError::Parse {
        reason,
        raw_snippet: snippet(raw),
    }
}

fn snippet(raw: &str) -> String {
    raw.chars().take(SNIPPET_CAP).collect()
}

/// Strips ```json ... ``` or ``` ... ``` code fences the model may wrap its
/// output in despite instructions.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

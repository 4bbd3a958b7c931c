//! Render Engine — converts a structured result into one of the supported
//! output formats without touching the model.
//!
//! Pure format dispatch. STRUCTURED mirrors `TailoredResult`'s own field
//! names and nesting (identical across formats for the same task kind);
//! TEXT is the flattened human-readable form; DOCUMENT paginates the text
//! blocks. The format set is a closed enum validated before the pipeline
//! starts, so an unsupported format cannot reach this module.

pub mod document;
pub mod text;

use bytes::Bytes;

use crate::config::RenderConfig;
use crate::errors::AppError;
use crate::models::result::{OutputFormat, RenderedOutput, TailoredResult};

pub fn render(
    result: &TailoredResult,
    format: OutputFormat,
    config: &RenderConfig,
) -> Result<RenderedOutput, AppError> {
    let payload = match format {
        OutputFormat::Structured => Bytes::from(render_structured(result)?),
        OutputFormat::Text => Bytes::from(text::render_text(result)),
        OutputFormat::Document => {
            // Pagination cannot make progress on a zero-line or zero-width
            // page; startup validation should have caught this already.
            if config.page_lines == 0 || config.page_width == 0 {
                return Err(AppError::Render(
                    "page geometry must be at least 1 line by 1 column".to_string(),
                ));
            }
            Bytes::from(document::render_document(result, config))
        }
    };
    Ok(RenderedOutput { format, payload })
}

/// Stable JSON serialization of the result. Field order follows the struct
/// definitions, so repeated renders are byte-identical.
fn render_structured(result: &TailoredResult) -> Result<Vec<u8>, AppError> {
    serde_json::to_vec_pretty(result)
        .map_err(|e| AppError::Render(format!("structured serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::result::{AnswerItem, AnswerSheet, CoverLetter};

    fn cover_letter() -> TailoredResult {
        TailoredResult::CoverLetter(CoverLetter {
            greeting: "Dear Hiring Manager,".into(),
            body_paragraphs: vec![
                "First paragraph about fit.".into(),
                "Second paragraph with a call to action.".into(),
            ],
            closing: "Sincerely,\nAlex".into(),
        })
    }

    #[test]
    fn test_structured_render_is_byte_identical_on_repeat() {
        let result = cover_letter();
        let config = RenderConfig::default();
        let a = render(&result, OutputFormat::Structured, &config).unwrap();
        let b = render(&result, OutputFormat::Structured, &config).unwrap();
        assert_eq!(a.payload, b.payload);
    }

    #[test]
    fn test_structured_render_mirrors_result_fields() {
        let out = render(&cover_letter(), OutputFormat::Structured, &RenderConfig::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out.payload).unwrap();
        assert_eq!(value["kind"], "cover_letter");
        assert_eq!(value["body_paragraphs"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_zero_page_geometry_is_a_render_error() {
        for config in [
            RenderConfig {
                page_lines: 0,
                page_width: 80,
            },
            RenderConfig {
                page_lines: 54,
                page_width: 0,
            },
        ] {
            let err = render(&cover_letter(), OutputFormat::Document, &config).unwrap_err();
            assert_eq!(err.kind(), "RENDER_ERROR");
        }
    }

    #[test]
    fn test_format_tag_round_trips_to_output() {
        let result = TailoredResult::Answers(AnswerSheet {
            answers: vec![AnswerItem {
                question: "Q".into(),
                answer: "A".into(),
            }],
        });
        for format in [
            OutputFormat::Structured,
            OutputFormat::Text,
            OutputFormat::Document,
        ] {
            let out = render(&result, format, &RenderConfig::default()).unwrap();
            assert_eq!(out.format, format);
            assert!(!out.payload.is_empty());
        }
    }
}

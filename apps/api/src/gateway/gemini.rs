//! Gemini REST client — the production [`GenerativeModel`] implementation.
//!
//! Model: gemini-2.0-flash (hardcoded — do not make configurable to prevent
//! drift between the prompt templates and model behavior).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::gateway::GenerativeModel;
use crate::models::task::{GenerationOptions, ModelFailure};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls.
pub const MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{MODEL}:generateContent")
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelFailure> {
        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature(),
                max_output_tokens: options.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // Connection/timeout problems are worth another attempt.
                ModelFailure::Transient {
                    reason: format!("HTTP error: {e}"),
                }
            })?;

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelFailure::Transient {
                reason: format!("API returned {status}: {}", error_message(&text)),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelFailure::Permanent {
                reason: format!("API returned {status}: {}", error_message(&text)),
            });
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            // A truncated/garbled success body is usually transient.
            ModelFailure::Transient {
                reason: format!("response decode failed: {e}"),
            }
        })?;

        if let Some(reason) = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .filter(|r| !r.is_empty())
        {
            return Err(ModelFailure::Permanent {
                reason: format!("prompt blocked by content policy: {reason}"),
            });
        }

        let candidate = parsed.candidates.into_iter().next().ok_or_else(|| {
            ModelFailure::Transient {
                reason: "response contained no candidates".to_string(),
            }
        })?;

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(ModelFailure::Permanent {
                reason: "candidate blocked by content policy".to_string(),
            });
        }

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }
}

/// Pulls the human-readable message out of a Gemini error body, falling
/// back to the raw text when it is not the documented shape.
fn error_message(body: &str) -> String {
    serde_json::from_str::<GeminiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

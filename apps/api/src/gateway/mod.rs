//! Model Gateway — the single point of entry for all generative-model calls.
//!
//! ARCHITECTURAL RULE: no other module may perform network I/O. Everything
//! upstream and downstream of this module is pure given its inputs.
//!
//! The external capability is the [`GenerativeModel`] trait; production uses
//! [`GeminiClient`] against the Gemini REST API. The gateway wraps a model
//! with the retry policy: exponential backoff on transient failures,
//! immediate propagation of permanent ones, and a hard caller-supplied
//! deadline covering all attempts. The gateway holds no state across calls.

pub mod gemini;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::RetryConfig;
use crate::errors::AppError;
use crate::models::task::{GenerationOptions, ModelFailure, ModelRequest};

pub use gemini::GeminiClient;

/// The opaque external generative capability. One operation; the caller
/// supplies the full prompt and generation parameters.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelFailure>;
}

/// Retry/backoff/deadline wrapper around a [`GenerativeModel`].
#[derive(Clone)]
pub struct ModelGateway {
    model: Arc<dyn GenerativeModel>,
    retry: RetryConfig,
}

impl ModelGateway {
    pub fn new(model: Arc<dyn GenerativeModel>, retry: RetryConfig) -> Self {
        Self { model, retry }
    }

    /// Invokes the model, retrying transient failures with exponential
    /// backoff (base * 2^n) up to the configured attempt cap. The whole
    /// operation, backoff included, is bounded by `deadline`.
    pub async fn invoke(
        &self,
        request: &ModelRequest,
        deadline: Instant,
    ) -> Result<String, AppError> {
        let mut last_reason = String::new();

        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                let delay = self.retry.base_delay * 2u32.pow(attempt - 1);
                if Instant::now() + delay >= deadline {
                    return Err(deadline_exceeded(attempt, &last_reason));
                }
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    reason = %last_reason,
                    "model attempt failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
            }

            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) if d > Duration::ZERO => d,
                _ => return Err(deadline_exceeded(attempt, &last_reason)),
            };

            let started = Instant::now();
            let outcome = tokio::time::timeout(
                remaining,
                self.model.generate(&request.prompt, &request.options),
            )
            .await;
            let latency_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Err(_) => return Err(deadline_exceeded(attempt + 1, "attempt timed out")),
                Ok(Ok(text)) if !text.trim().is_empty() => {
                    debug!(
                        attempt,
                        latency_ms,
                        task = request.task.as_str(),
                        chars = text.len(),
                        "model attempt succeeded"
                    );
                    return Ok(text);
                }
                Ok(Ok(_)) => {
                    debug!(attempt, latency_ms, "model returned empty content");
                    last_reason = "model returned empty content".to_string();
                }
                Ok(Err(ModelFailure::Transient { reason })) => {
                    debug!(attempt, latency_ms, reason = %reason, "transient model failure");
                    last_reason = reason;
                }
                Ok(Err(ModelFailure::Permanent { reason })) => {
                    warn!(attempt, latency_ms, reason = %reason, "permanent model failure");
                    return Err(AppError::ModelPermanent(reason));
                }
            }
        }

        Err(AppError::ModelTransient(format!(
            "gave up after {} attempts: {last_reason}",
            self.retry.max_attempts
        )))
    }
}

fn deadline_exceeded(attempts_made: u32, last_reason: &str) -> AppError {
    let detail = if last_reason.is_empty() {
        String::new()
    } else {
        format!(" (last failure: {last_reason})")
    };
    AppError::ModelTransient(format!(
        "deadline exceeded after {attempts_made} attempt(s){detail}"
    ))
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type covering the whole pipeline taxonomy.
///
/// Variants are `Clone` because a single flight's outcome is fanned out to
/// every request waiting on the same fingerprint.
///
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Caller-supplied data violates shape constraints. Not retryable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeout, rate limit, or upstream 5xx — retried internally, surfaced
    /// only after the retry budget is exhausted. Retryable by the caller.
    #[error("Model transient failure: {0}")]
    ModelTransient(String),

    /// Authentication or content-policy rejection. Surfaced immediately,
    /// not retryable.
    #[error("Model permanent failure: {0}")]
    ModelPermanent(String),

    /// Model output did not match the expected schema, even after the
    /// single internal re-generation. A fresh submission may succeed.
    #[error("Parse error: {reason}")]
    Parse { reason: String, raw_snippet: String },

    /// Programmer/configuration defect in rendering. Never a caller mistake.
    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    /// Stable machine-readable kind string. Callers key retry UX off this.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::ModelTransient(_) => "MODEL_TRANSIENT",
            AppError::ModelPermanent(_) => "MODEL_PERMANENT",
            AppError::Parse { .. } => "PARSE_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
        }
    }

    /// Whether resubmitting the same request could plausibly succeed.
    pub fn retryable(&self) -> bool {
        matches!(self, AppError::ModelTransient(_) | AppError::Parse { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::ModelTransient(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ModelPermanent(_) => StatusCode::BAD_GATEWAY,
            AppError::Parse { .. } => StatusCode::BAD_GATEWAY,
            AppError::Render(msg) => {
                tracing::error!("Render defect: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
                "retryable": self.retryable(),
            }
        }));

        (status, body).into_response()
    }
}

//! POST /api/v1/generate — the single generation endpoint.
//!
//! Thin by design: deserialize, hand off to the orchestrator, and return
//! the rendered bytes with the content type the requested format implies.
//! All validation and failure translation lives in the pipeline.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::pipeline::GenerateRequest;
use crate::state::AppState;

pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let output = state.orchestrator.generate(request).await?;
    Ok((
        [(header::CONTENT_TYPE, output.content_type())],
        output.payload,
    )
        .into_response())
}

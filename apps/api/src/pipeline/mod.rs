//! Pipeline Orchestrator — composes prompt building, the model gateway,
//! parsing, and rendering into the three generation operations.
//!
//! Per request: `Received → Prompted → ModelCalled → Parsed → Rendered →
//! Done`, with `Failed` reachable from the middle states. The orchestrator
//! owns request normalization, fingerprinting, and single-flight
//! de-duplication; on a parse failure it re-enters `Prompted` exactly once
//! with a fresh generation before failing terminally. It is also the only
//! place internal failures are translated into the caller-visible shape.

pub mod fingerprint;
pub mod singleflight;

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{RenderConfig, ValidationConfig};
use crate::errors::AppError;
use crate::gateway::ModelGateway;
use crate::models::job::JobDescription;
use crate::models::result::{OutputFormat, RenderedOutput};
use crate::models::resume::Resume;
use crate::models::task::{GenerationOptions, TaskKind};
use crate::parser::ParseExpectation;
use crate::pipeline::fingerprint::fingerprint;
use crate::pipeline::singleflight::{FlightClaim, FlightOutcome, FlightTable, OutcomeReceiver};
use crate::{parser, prompt, render};

/// One fresh generation is requested when the first model response fails
/// validation; the second parse failure is terminal.
const PARSE_RETRY_LIMIT: u32 = 1;

/// Inbound generation request. Task and format are closed enums, so
/// deserialization itself enforces membership.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub resume: Resume,
    pub job_description: JobDescription,
    pub task: TaskKind,
    #[serde(default)]
    pub questions: Vec<String>,
    pub format: OutputFormat,
    #[serde(default)]
    pub options: Option<GenerationOptions>,
}

impl GenerateRequest {
    pub fn effective_options(&self) -> GenerationOptions {
        self.options.unwrap_or_default()
    }
}

/// Pipeline stages, in order. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Prompted,
    ModelCalled,
    Parsed,
    Rendered,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Prompted => "prompted",
            Stage::ModelCalled => "model_called",
            Stage::Parsed => "parsed",
            Stage::Rendered => "rendered",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Orchestrator {
    gateway: ModelGateway,
    flights: Arc<FlightTable>,
    validation: ValidationConfig,
    render: RenderConfig,
    request_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        gateway: ModelGateway,
        validation: ValidationConfig,
        render: RenderConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            flights: Arc::new(FlightTable::new()),
            validation,
            render,
            request_timeout,
        }
    }

    /// Runs one generation request end to end, joining an identical
    /// in-flight request when one exists.
    pub async fn generate(&self, request: GenerateRequest) -> Result<RenderedOutput, AppError> {
        let request = normalize(request)?;
        let request_id = Uuid::new_v4();
        let fp = fingerprint(&request);
        let deadline = Instant::now() + self.request_timeout;

        debug!(
            %request_id,
            fingerprint = %fp,
            stage = %Stage::Received,
            task = request.task.as_str(),
            format = request.format.as_str(),
            "generation request received"
        );

        match self.flights.claim(fp.clone()) {
            FlightClaim::Waiter(rx) => {
                debug!(%request_id, fingerprint = %fp, "attached to in-flight generation");
                await_outcome(rx, deadline).await
            }
            FlightClaim::Owner(tx) => {
                let rx = tx.subscribe();
                let gateway = self.gateway.clone();
                let validation = self.validation.clone();
                let render_config = self.render.clone();
                let flights = Arc::clone(&self.flights);
                let flight_fp = fp.clone();

                tokio::spawn(async move {
                    let outcome = tokio::select! {
                        out = run_flight(
                            gateway,
                            validation,
                            render_config,
                            request,
                            request_id,
                            deadline,
                        ) => Some(out),
                        // Every waiter (owner included) detached: nobody is
                        // left to consume the result.
                        _ = tx.closed() => None,
                    };
                    flights.release(&flight_fp);
                    match outcome {
                        Some(out) => {
                            let _ = tx.send(Some(out));
                        }
                        None => {
                            debug!(%request_id, fingerprint = %flight_fp, "all waiters detached, flight canceled")
                        }
                    }
                });

                await_outcome(rx, deadline).await
            }
        }
    }
}

/// Waits for a flight outcome, detaching (dropping the receiver) if the
/// caller's deadline expires first. Detaching never aborts a flight that
/// still has other waiters.
async fn await_outcome(mut rx: OutcomeReceiver, deadline: Instant) -> Result<RenderedOutput, AppError> {
    let wait = async {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                return Err(AppError::ModelTransient(
                    "shared generation was canceled before completing".to_string(),
                ));
            }
        }
    };

    match tokio::time::timeout_at(deadline, wait).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AppError::ModelTransient(
            "deadline exceeded while waiting for generation".to_string(),
        )),
    }
}

/// Boundary validation and request normalization. Shape violations are the
/// caller's fault and are never retried.
fn normalize(mut request: GenerateRequest) -> Result<GenerateRequest, AppError> {
    if request.resume.is_empty() {
        return Err(AppError::InvalidInput(
            "resume must contain at least one non-empty section".to_string(),
        ));
    }
    if request.job_description.is_empty() {
        return Err(AppError::InvalidInput(
            "job description must be non-empty".to_string(),
        ));
    }
    match request.task {
        TaskKind::AnswerQuestions => {
            for question in &mut request.questions {
                *question = question.trim().to_string();
            }
            if request.questions.is_empty() || request.questions.iter().any(String::is_empty) {
                return Err(AppError::InvalidInput(
                    "answer_questions requires at least one non-empty question".to_string(),
                ));
            }
        }
        // Stray questions on other tasks would needlessly split fingerprints.
        _ => request.questions.clear(),
    }
    Ok(request)
}

/// The owned flight: prompt → model → parse (with one re-generation on
/// parse failure) → render.
async fn run_flight(
    gateway: ModelGateway,
    validation: ValidationConfig,
    render_config: RenderConfig,
    request: GenerateRequest,
    request_id: Uuid,
    deadline: Instant,
) -> FlightOutcome {
    let expectation = ParseExpectation::for_request(
        request.task,
        &request.resume,
        &request.questions,
        &validation,
    );
    let options = request.effective_options();
    let mut parse_retries = 0u32;

    let result = loop {
        let model_request = match prompt::build(
            &request.resume,
            &request.job_description,
            request.task,
            &request.questions,
            options,
        ) {
            Ok(r) => r,
            Err(e) => return fail(request_id, Stage::Prompted, e),
        };
        debug!(%request_id, stage = %Stage::Prompted, "prompt built");

        let raw = match gateway.invoke(&model_request, deadline).await {
            Ok(raw) => raw,
            Err(e) => return fail(request_id, Stage::ModelCalled, e),
        };
        debug!(%request_id, stage = %Stage::ModelCalled, chars = raw.len(), "model responded");

        match parser::parse(&raw, &expectation) {
            Ok(result) => {
                debug!(%request_id, stage = %Stage::Parsed, "model output validated");
                break result;
            }
            Err(e) if parse_retries < PARSE_RETRY_LIMIT => {
                parse_retries += 1;
                warn!(
                    %request_id,
                    error = %e,
                    "model output failed validation, requesting one fresh generation"
                );
            }
            Err(e) => return fail(request_id, Stage::Parsed, e),
        }
    };

    let rendered = match render::render(&result, request.format, &render_config) {
        Ok(out) => out,
        Err(e) => return fail(request_id, Stage::Rendered, e),
    };
    debug!(
        %request_id,
        stage = %Stage::Done,
        format = request.format.as_str(),
        bytes = rendered.payload.len(),
        "generation complete"
    );
    Ok(rendered)
}

fn fail(request_id: Uuid, at: Stage, error: AppError) -> FlightOutcome {
    warn!(
        %request_id,
        stage = %Stage::Failed,
        failed_at = %at,
        kind = error.kind(),
        retryable = error.retryable(),
        "pipeline failed: {error}"
    );
    Err(error)
}

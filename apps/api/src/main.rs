mod config;
mod errors;
mod gateway;
mod models;
mod parser;
mod pipeline;
mod prompt;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::{GeminiClient, ModelGateway};
use crate::pipeline::Orchestrator;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumer API v{}", env!("CARGO_PKG_VERSION"));

    // Model gateway: the sole I/O boundary of the pipeline
    let model = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    let gateway = ModelGateway::new(model, config.retry.clone());
    info!(
        "Model gateway initialized (model: {}, max_attempts: {})",
        gateway::gemini::MODEL,
        config.retry.max_attempts
    );

    // Orchestrator owns fingerprinting and single-flight de-duplication
    let orchestrator = Arc::new(Orchestrator::new(
        gateway,
        config.validation.clone(),
        config.render.clone(),
        config.request_timeout,
    ));

    let state = AppState {
        orchestrator,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version plus the effective generation limits, so
/// operators can confirm what configuration a running instance loaded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resumer-api",
        "limits": {
            "retry_max_attempts": config.retry.max_attempts,
            "request_timeout_secs": config.request_timeout.as_secs(),
            "cover_letter_min_body_chars": config.validation.cover_letter_min_body_chars,
            "page_lines": config.render.page_lines,
            "page_width": config.render.page_width,
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::config::Config;
    use crate::gateway::{GenerativeModel, ModelGateway};
    use crate::models::task::{GenerationOptions, ModelFailure};
    use crate::pipeline::Orchestrator;

    struct UnusedModel;

    #[async_trait::async_trait]
    impl GenerativeModel for UnusedModel {
        async fn generate(
            &self,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, ModelFailure> {
            Err(ModelFailure::Permanent {
                reason: "not called".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_health_reports_version_and_limits() {
        let config = Config {
            gemini_api_key: "test-key".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
            retry: Default::default(),
            validation: Default::default(),
            render: Default::default(),
            request_timeout: Duration::from_secs(120),
        };
        let gateway = ModelGateway::new(Arc::new(UnusedModel), config.retry.clone());
        let orchestrator = Arc::new(Orchestrator::new(
            gateway,
            config.validation.clone(),
            config.render.clone(),
            config.request_timeout,
        ));
        let state = AppState {
            orchestrator,
            config,
        };

        let Json(body) = health_handler(State(state)).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["limits"]["retry_max_attempts"], 3);
        assert_eq!(body["limits"]["cover_letter_min_body_chars"], 200);
        assert_eq!(body["limits"]["page_lines"], 54);
    }
}

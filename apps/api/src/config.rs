use std::time::Duration;

use anyhow::{ensure, Context, Result};

/// Application configuration loaded from environment variables.
/// Fails fast at startup if required variables are missing.
///
/// Policy thresholds (retry budget, backoff base, cover-letter minimum
/// length, page geometry) are deliberately tunable here rather than
/// hard-coded in the components that consume them.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub retry: RetryConfig,
    pub validation: ValidationConfig,
    pub render: RenderConfig,
    /// Default per-request deadline when the caller supplies none.
    pub request_timeout: Duration,
}

/// Model Gateway retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first. Transient failures beyond this
    /// surface as MODEL_TRANSIENT.
    pub max_attempts: u32,
    /// Backoff before attempt n+1 is base * 2^n.
    pub base_delay: Duration,
}

/// Response Parser validation thresholds.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Minimum combined length of cover-letter body paragraphs, in chars.
    pub cover_letter_min_body_chars: usize,
}

/// Document-format page geometry.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Text rows per page, excluding the page header.
    pub page_lines: usize,
    /// Columns per row; longer lines wrap.
    pub page_width: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            retry: RetryConfig {
                max_attempts: env_or("RETRY_MAX_ATTEMPTS", "3")
                    .parse::<u32>()
                    .context("RETRY_MAX_ATTEMPTS must be a positive integer")?,
                base_delay: Duration::from_millis(
                    env_or("RETRY_BASE_DELAY_MS", "500")
                        .parse::<u64>()
                        .context("RETRY_BASE_DELAY_MS must be an integer")?,
                ),
            },
            validation: ValidationConfig {
                cover_letter_min_body_chars: env_or("COVER_LETTER_MIN_BODY_CHARS", "200")
                    .parse::<usize>()
                    .context("COVER_LETTER_MIN_BODY_CHARS must be an integer")?,
            },
            render: RenderConfig {
                page_lines: env_or("PAGE_LINES", "54")
                    .parse::<usize>()
                    .context("PAGE_LINES must be an integer")?,
                page_width: env_or("PAGE_WIDTH", "80")
                    .parse::<usize>()
                    .context("PAGE_WIDTH must be an integer")?,
            }
            .validated()?,
            request_timeout: Duration::from_secs(
                env_or("REQUEST_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("REQUEST_TIMEOUT_SECS must be an integer")?,
            ),
        })
    }
}

impl RenderConfig {
    /// Zero page geometry would make pagination impossible, so it is
    /// rejected at load time rather than surfacing per request.
    fn validated(self) -> Result<Self> {
        ensure!(self.page_lines > 0, "PAGE_LINES must be at least 1");
        ensure!(self.page_width > 0, "PAGE_WIDTH must be at least 1");
        Ok(self)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            cover_letter_min_body_chars: 200,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            page_lines: 54,
            page_width: 80,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

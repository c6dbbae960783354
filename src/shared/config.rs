//! Application configuration. API credentials, paths, classifier settings.
//!
//! Read from `TRIAGE_*` environment variables (and `.env`), plus an optional file named by `TRIAGE_CONFIG`.

use crate::usecases::listener::DEFAULT_MAX_IN_FLIGHT;
use serde::Deserialize;
use std::time::Duration;

/// Default upper bound for one classification request.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    /// Sign in as a bot instead of a user account. Read from TRIAGE_BOT_TOKEN.
    #[serde(default)]
    pub bot_token: Option<String>,
    pub session_path: Option<String>,

    /// Replay updates missed while offline. Read from TRIAGE_CATCH_UP.
    #[serde(default)]
    pub catch_up: Option<bool>,

    /// Max handlers running at once. Read from TRIAGE_MAX_IN_FLIGHT.
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Classifier Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key. Read from TRIAGE_AI_API_KEY, falling back to OPENAI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI. Read from TRIAGE_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4o-mini". Read from TRIAGE_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Request timeout in seconds. Read from TRIAGE_AI_TIMEOUT_SECS.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,

    /// Use the offline mock instead of the HTTP API. Read from TRIAGE_AI_MOCK.
    #[serde(default)]
    pub ai_mock: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("TRIAGE_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("TRIAGE").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| "./session.db".to_string())
    }

    pub fn catch_up_or_default(&self) -> bool {
        self.catch_up.unwrap_or(false)
    }

    /// Returns the handler concurrency cap. Defaults to DEFAULT_MAX_IN_FLIGHT; 0 is treated as 1.
    pub fn max_in_flight_or_default(&self) -> usize {
        self.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT).max(1)
    }

    /// Returns the bot token if set and non-empty.
    pub fn bot_token(&self) -> Option<String> {
        self.bot_token.clone().filter(|t| !t.trim().is_empty())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Classifier Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured. Reads from config or OPENAI_API_KEY env.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-4o-mini".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string())
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(
            self.ai_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_AI_TIMEOUT_SECS),
        )
    }

    pub fn ai_mock_enabled(&self) -> bool {
        self.ai_mock.unwrap_or(false)
    }

    /// Returns true if the classifier can run: a key is present or the mock is enabled.
    pub fn is_ai_configured(&self) -> bool {
        self.ai_mock_enabled() || self.ai_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session_path_or_default(), "./session.db");
        assert_eq!(cfg.ai_model_or_default(), "gpt-4o-mini");
        assert_eq!(
            cfg.ai_api_url_or_default(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(cfg.ai_timeout(), Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS));
        assert_eq!(cfg.max_in_flight_or_default(), DEFAULT_MAX_IN_FLIGHT);
        assert!(!cfg.catch_up_or_default());
        assert!(!cfg.ai_mock_enabled());
    }

    #[test]
    fn test_zero_values_fall_back() {
        let cfg = AppConfig {
            ai_timeout_secs: Some(0),
            max_in_flight: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.ai_timeout(), Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS));
        assert_eq!(cfg.max_in_flight_or_default(), 1);
    }

    #[test]
    fn test_blank_secrets_are_unset() {
        let cfg = AppConfig {
            ai_api_key: Some("sk-live".into()),
            bot_token: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.ai_api_key().as_deref(), Some("sk-live"));
        assert!(cfg.bot_token().is_none());
    }

    #[test]
    fn test_mock_counts_as_configured() {
        let cfg = AppConfig {
            ai_mock: Some(true),
            ..Default::default()
        };
        assert!(cfg.is_ai_configured());
    }
}

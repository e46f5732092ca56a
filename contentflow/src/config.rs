//! Configuration for the completion client and the pipeline.
//!
//! Values are read once at startup. Every loader takes a lookup closure so
//! callers can feed it `std::env::var` or a fixed map in tests.

use crate::errors::ConfigError;
use crate::pipeline::FailureMode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable holding the model name.
pub const ENV_MODEL_NAME: &str = "MODEL_NAME";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "COMPLETION_TIMEOUT_SECS";
/// Environment variable selecting the pipeline failure mode.
pub const ENV_FAILURE_MODE: &str = "PIPELINE_FAILURE_MODE";

/// Reads a variable from the process environment.
pub fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Settings for the chat-completion service.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Bearer token sent with every request.
    #[serde(skip_serializing)]
    pub api_key: String,
    /// Base URL, without the trailing `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name passed through to the service.
    pub model: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl CompletionConfig {
    /// Creates a configuration with default base URL and timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: model.into(),
            timeout_seconds: default_timeout(),
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Returns the full chat-completions endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Loads the configuration through `lookup`.
    ///
    /// The API key and model name are required; there is no fallback model.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, ENV_API_KEY)?;
        let model = required(&lookup, ENV_MODEL_NAME)?;

        let mut config = Self::new(api_key, model);

        if let Some(base_url) = optional(&lookup, ENV_BASE_URL) {
            config.base_url = base_url;
        }

        if let Some(raw) = optional(&lookup, ENV_TIMEOUT) {
            config.timeout_seconds = raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::invalid(ENV_TIMEOUT, raw))?;
        }

        Ok(config)
    }
}

/// Settings for pipeline execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// What happens after a stage fails.
    #[serde(default)]
    pub failure_mode: FailureMode,
}

impl PipelineConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Loads the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let failure_mode = match optional(&lookup, ENV_FAILURE_MODE) {
            Some(raw) => raw
                .parse::<FailureMode>()
                .map_err(|_| ConfigError::invalid(ENV_FAILURE_MODE, raw))?,
            None => FailureMode::default(),
        };

        Ok(Self { failure_mode })
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| ConfigError::Missing(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_completion_config_requires_model() {
        let err = CompletionConfig::from_lookup(lookup_from(&[(ENV_API_KEY, "sk-test")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_MODEL_NAME.to_string()));
    }

    #[test]
    fn test_completion_config_requires_api_key() {
        let err = CompletionConfig::from_lookup(lookup_from(&[(ENV_MODEL_NAME, "gpt-4o")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_API_KEY.to_string()));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = CompletionConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL_NAME, "   "),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_MODEL_NAME.to_string()));
    }

    #[test]
    fn test_completion_config_defaults() {
        let config = CompletionConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL_NAME, "qwen-plus"),
        ]))
        .unwrap();

        assert_eq!(config.model, "qwen-plus");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_completion_config_overrides() {
        let config = CompletionConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL_NAME, "qwen-plus"),
            (ENV_BASE_URL, "http://localhost:11434/v1/"),
            (ENV_TIMEOUT, "15"),
        ]))
        .unwrap();

        assert_eq!(config.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(config.timeout_seconds, 15);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = CompletionConfig::from_lookup(lookup_from(&[
            (ENV_API_KEY, "sk-test"),
            (ENV_MODEL_NAME, "qwen-plus"),
            (ENV_TIMEOUT, "soon"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::invalid(ENV_TIMEOUT, "soon"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CompletionConfig::new("sk-secret", "gpt-4o");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("gpt-4o"));
    }

    #[test]
    fn test_serialization_skips_api_key() {
        let config = CompletionConfig::new("sk-secret", "gpt-4o");
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("api_key").is_none());
        assert_eq!(json["model"], "gpt-4o");
    }

    #[test]
    fn test_pipeline_config() {
        let config = PipelineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.failure_mode, FailureMode::FailFast);

        let config = PipelineConfig::from_lookup(lookup_from(&[(
            ENV_FAILURE_MODE,
            "continue_on_failure",
        )]))
        .unwrap();
        assert_eq!(config.failure_mode, FailureMode::ContinueOnFailure);

        assert!(PipelineConfig::from_lookup(lookup_from(&[(ENV_FAILURE_MODE, "yolo")])).is_err());
    }
}

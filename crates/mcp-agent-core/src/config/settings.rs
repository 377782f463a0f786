//! Model settings read from `OPENAI_*` environment variables

use std::env;
use std::time::Duration;

use super::error::{ConfigError, ConfigResult};

pub const DEFAULT_MODEL: &str = "deepseek-chat";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_MAX_RETRIES: u32 = 3;

const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Settings for the chat-completion model
///
/// Recognized variables:
/// - `OPENAI_API_KEY` (required by `require_api_key`)
/// - `OPENAI_BASE_URL`
/// - `OPENAI_MODEL`, then `OPENAI_MODEL_NAME` (default `deepseek-chat`)
/// - `OPENAI_TEMPERATURE` (default 0.2, unparsable values fall back)
/// - `OPENAI_TIMEOUT` in seconds (default 60, unparsable values fall back)
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl AgentSettings {
    /// Load `.env` (overriding the process environment) and read the settings
    pub fn from_env() -> Self {
        // A missing or unreadable .env is fine; the process environment still applies
        let _ = dotenvy::dotenv_override();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model = get("OPENAI_MODEL")
            .or_else(|| get("OPENAI_MODEL_NAME"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let temperature = get("OPENAI_TEMPERATURE")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|t| t.is_finite())
            .unwrap_or(DEFAULT_TEMPERATURE);

        let timeout_secs = get("OPENAI_TIMEOUT")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key: get(API_KEY_VAR),
            base_url: get("OPENAI_BASE_URL"),
            model,
            temperature,
            timeout: Duration::from_secs(timeout_secs),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The API key, or an error naming the missing variable
    pub fn require_api_key(&self) -> ConfigResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnv(API_KEY_VAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = AgentSettings::from_lookup(lookup(&[]));
        assert_eq!(settings, AgentSettings::default());
        assert!(settings.require_api_key().is_err());
    }

    #[test]
    fn test_reads_all_variables() {
        let settings = AgentSettings::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "  sk-test  "),
            ("OPENAI_BASE_URL", "https://llm.example.com/v1"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("OPENAI_TEMPERATURE", "0.7"),
            ("OPENAI_TIMEOUT", "15"),
        ]));

        assert_eq!(settings.require_api_key().unwrap(), "sk-test");
        assert_eq!(settings.base_url.as_deref(), Some("https://llm.example.com/v1"));
        assert_eq!(settings.model, "gpt-4o-mini");
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_model_name_fallback() {
        let settings = AgentSettings::from_lookup(lookup(&[("OPENAI_MODEL_NAME", "qwen-plus")]));
        assert_eq!(settings.model, "qwen-plus");

        let settings = AgentSettings::from_lookup(lookup(&[
            ("OPENAI_MODEL", "first"),
            ("OPENAI_MODEL_NAME", "second"),
        ]));
        assert_eq!(settings.model, "first");
    }

    #[test]
    fn test_bad_numbers_fall_back_silently() {
        let settings = AgentSettings::from_lookup(lookup(&[
            ("OPENAI_TEMPERATURE", "warm"),
            ("OPENAI_TIMEOUT", "-5"),
        ]));
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let settings = AgentSettings::from_lookup(lookup(&[("OPENAI_TIMEOUT", "0")]));
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_missing_key_error_names_variable() {
        let err = AgentSettings::default().require_api_key().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

//! Model provider configuration from environment variables.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default OpenAI-compatible base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default Anthropic base URL.
pub const DEFAULT_CLAUDE_BASE_URL: &str = "https://api.anthropic.com/v1";

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Large pages make generation slow; typical API timeouts are far too short.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Claude,
    Fake,
}

impl ProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "openrouter" => Some(ProviderKind::OpenAi),
            "claude" | "anthropic" => Some(ProviderKind::Claude),
            "fake" => Some(ProviderKind::Fake),
            _ => None,
        }
    }
}

/// Model provider configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Required for every provider except `fake`.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Load configuration from environment variables.
    ///
    /// - `LARDER_AI_PROVIDER`: "openai" (default), "claude" or "fake"
    /// - `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`: key for the chosen provider
    /// - `LARDER_AI_MODEL`: model name (provider-specific default)
    /// - `LARDER_AI_BASE_URL`: API base URL (provider-specific default)
    /// - `LARDER_AI_TIMEOUT_SECS`: request timeout (default: 120)
    /// - `LARDER_AI_MAX_TOKENS`: completion token cap (default: 4096)
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("LARDER_AI_PROVIDER") {
            Ok(value) => ProviderKind::parse(&value).ok_or(ConfigError::InvalidValue {
                name: "LARDER_AI_PROVIDER".to_string(),
                value,
            })?,
            Err(_) => ProviderKind::OpenAi,
        };

        let (key_var, default_model, default_base_url) = match provider {
            ProviderKind::OpenAi => (
                "OPENAI_API_KEY",
                DEFAULT_OPENAI_MODEL,
                DEFAULT_OPENAI_BASE_URL,
            ),
            ProviderKind::Claude => (
                "ANTHROPIC_API_KEY",
                DEFAULT_CLAUDE_MODEL,
                DEFAULT_CLAUDE_BASE_URL,
            ),
            ProviderKind::Fake => ("", "fake-model", ""),
        };

        let api_key = if provider == ProviderKind::Fake {
            None
        } else {
            Some(env::var(key_var).map_err(|_| ConfigError::MissingEnvVar(key_var.to_string()))?)
        };

        let model = env::var("LARDER_AI_MODEL").unwrap_or_else(|_| default_model.to_string());
        let base_url =
            env::var("LARDER_AI_BASE_URL").unwrap_or_else(|_| default_base_url.to_string());

        let timeout_secs = parse_env_or("LARDER_AI_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let max_tokens = parse_env_or("LARDER_AI_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            max_tokens,
        })
    }

    /// Configuration for the fake provider, used by tests and offline runs.
    pub fn fake() -> Self {
        Self {
            provider: ProviderKind::Fake,
            api_key: None,
            model: "fake-model".to_string(),
            base_url: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_are_case_insensitive() {
        assert_eq!(ProviderKind::parse("OpenAI"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse(" claude "), Some(ProviderKind::Claude));
        assert_eq!(ProviderKind::parse("openrouter"), Some(ProviderKind::OpenAi));
        assert_eq!(ProviderKind::parse("gemini"), None);
    }

    #[test]
    fn fake_config_needs_no_key() {
        let config = LlmConfig::fake();
        assert_eq!(config.provider, ProviderKind::Fake);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(120));
    }
}

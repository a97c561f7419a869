//! LLM provider abstraction: the model invoker behind every AI task.
//!
//! Providers are stateless service objects built once at start-up (see
//! [`create_provider`]) and passed by reference into each pipeline call.
//! Failures come back as a closed [`LlmError`] so callers can tell an
//! oversized prompt apart from everything else without inspecting payloads.

mod claude;
mod config;
mod fake;
mod openai;
mod types;

pub use claude::ClaudeProvider;
pub use config::{ConfigError, LlmConfig, ProviderKind};
pub use fake::FakeProvider;
pub use openai::OpenAiProvider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, Usage};

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for LLM operations.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Input exceeds the model's context window: {0}")]
    InputTooLarge(String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// True when the endpoint rejected the prompt for its size.
    pub fn is_input_too_large(&self) -> bool {
        matches!(self, LlmError::InputTooLarge(_))
    }
}

/// Trait for LLM providers.
///
/// Implementations must be stateless and thread-safe. The provider makes the
/// API call and returns the model's text; it never retries.
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a chat request and return the completion text.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;

    /// Provider name (e.g., "openai", "claude", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g., "gpt-4o-mini").
    fn model_name(&self) -> &str;
}

/// Build the provider described by `config`.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.provider {
        ProviderKind::Fake => Ok(Box::new(FakeProvider::default())),
        ProviderKind::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                LlmError::NotConfigured("OPENAI_API_KEY not set".to_string())
            })?;
            Ok(Box::new(OpenAiProvider::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
                config.timeout,
            )?
            .with_max_tokens(config.max_tokens)))
        }
        ProviderKind::Claude => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                LlmError::NotConfigured("ANTHROPIC_API_KEY not set".to_string())
            })?;
            Ok(Box::new(ClaudeProvider::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
                config.timeout,
            )?
            .with_max_tokens(config.max_tokens)))
        }
    }
}

/// Build the provider configured through environment variables.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, LlmError> {
    let config = LlmConfig::from_env().map_err(|e| LlmError::NotConfigured(e.to_string()))?;
    create_provider(&config)
}

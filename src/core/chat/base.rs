//! Base trait and shared types for reply generation providers.

use async_trait::async_trait;

use crate::core::session::Turn;

/// Result type for reply generation operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Errors produced by reply generation providers.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// API key missing or rejected
    #[error("chat authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider rejected the request due to rate limiting
    #[error("chat rate limited: {0}")]
    RateLimited(String),

    /// Request could not be sent or the response could not be read
    #[error("chat network error: {0}")]
    NetworkError(String),

    /// The provider returned an error response or an unusable completion
    #[error("chat provider error: {0}")]
    ProviderError(String),

    /// Provider configuration was invalid
    #[error("chat configuration error: {0}")]
    ConfigurationError(String),
}

/// Base configuration for reply generation providers.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Provider API key
    pub api_key: String,
    /// Provider model identifier
    pub model: String,
    /// Sampling temperature; provider default when `None`
    pub temperature: Option<f32>,
    /// Endpoint override (tests, proxies); provider default when `None`
    pub api_url: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            temperature: None,
            api_url: None,
        }
    }
}

/// Trait implemented by reply generation providers.
///
/// The provider receives the entire ordered conversation transcript,
/// seed system turn included, so replies are conditioned on full prior context,
/// not just the latest utterance.
#[async_trait]
pub trait BaseChat: Send + Sync {
    /// Generate the assistant reply for the given transcript.
    async fn generate(&self, history: &[Turn]) -> ChatResult<String>;

    /// Short provider identifier for logs.
    fn provider_name(&self) -> &'static str;
}

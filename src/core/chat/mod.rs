mod base;
pub mod openai;

pub use base::{BaseChat, ChatConfig, ChatError, ChatResult};
pub use openai::OpenAIChat;

use std::sync::Arc;

/// Factory function to create a reply generation provider.
///
/// # Supported Providers
///
/// - `"openai"` - OpenAI chat completions API
pub fn create_chat_provider(
    provider_type: &str,
    config: ChatConfig,
) -> ChatResult<Arc<dyn BaseChat>> {
    match provider_type.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAIChat::new(config)?)),
        _ => Err(ChatError::ConfigurationError(format!(
            "Unsupported chat provider: {provider_type}. Supported providers: openai"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_chat_provider() {
        let config = ChatConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        assert!(create_chat_provider("openai", config).is_ok());
        assert!(create_chat_provider("invalid", ChatConfig::default()).is_err());
    }
}

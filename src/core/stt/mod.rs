mod base;
pub mod openai;

pub use base::{AudioInputFormat, BaseSTT, STTConfig, STTError, STTResult};
pub use openai::{OpenAISTT, OpenAISTTModel};

use std::sync::Arc;

/// Factory function to create an STT provider.
///
/// # Supported Providers
///
/// - `"openai"` - OpenAI Whisper transcription API
pub fn create_stt_provider(provider_type: &str, config: STTConfig) -> STTResult<Arc<dyn BaseSTT>> {
    match provider_type.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAISTT::new(config)?)),
        _ => Err(STTError::ConfigurationError(format!(
            "Unsupported STT provider: {provider_type}. Supported providers: openai"
        ))),
    }
}

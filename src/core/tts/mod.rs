mod base;
pub mod openai;

pub use base::{AudioOutputFormat, BaseTTS, TTSConfig, TTSError, TTSResult};
pub use openai::{OPENAI_TTS_URL, OpenAITTS, OpenAITTSModel, OpenAIVoice};

use std::sync::Arc;

/// Factory function to create a TTS provider.
///
/// # Supported Providers
///
/// - `"openai"` - OpenAI speech synthesis API (tts-1, tts-1-hd, gpt-4o-mini-tts)
pub fn create_tts_provider(provider_type: &str, config: TTSConfig) -> TTSResult<Arc<dyn BaseTTS>> {
    match provider_type.to_lowercase().as_str() {
        "openai" => Ok(Arc::new(OpenAITTS::new(config)?)),
        _ => Err(TTSError::ConfigurationError(format!(
            "Unsupported TTS provider: {provider_type}. Supported providers: openai"
        ))),
    }
}

//! Base trait and shared types for speech-to-text providers.
//!
//! Transcription in this gateway is a one-shot, per-utterance call: the
//! transport delivers one finalized utterance buffer per turn, the provider
//! transcribes it in full, and nothing is buffered across turns. Providers
//! are stateless and safe to share across sessions behind an `Arc`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result type for STT operations.
pub type STTResult<T> = Result<T, STTError>;

/// Errors produced by STT providers.
#[derive(Debug, thiserror::Error)]
pub enum STTError {
    /// API key missing or rejected
    #[error("STT authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Request could not be sent or the response could not be read
    #[error("STT network error: {0}")]
    NetworkError(String),

    /// The provider returned an error response
    #[error("STT provider error: {0}")]
    ProviderError(String),

    /// The utterance buffer was unusable (empty, oversized)
    #[error("STT audio processing error: {0}")]
    AudioProcessingError(String),

    /// Provider configuration was invalid
    #[error("STT configuration error: {0}")]
    ConfigurationError(String),
}

/// Container format of the utterance buffer handed to transcription.
///
/// The buffer is forwarded to the provider as-is; this only selects the
/// filename and MIME type of the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioInputFormat {
    /// WebM/Opus, the browser MediaRecorder default
    #[default]
    Webm,
    /// Ogg/Opus
    Ogg,
    /// WAV (PCM)
    Wav,
    /// MP3
    Mp3,
}

impl AudioInputFormat {
    /// MIME type for the multipart upload.
    #[inline]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Webm => "audio/webm",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }

    /// Filename for the multipart upload.
    #[inline]
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Webm => "audio.webm",
            Self::Ogg => "audio.ogg",
            Self::Wav => "audio.wav",
            Self::Mp3 => "audio.mp3",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "webm" => Self::Webm,
            "ogg" | "oga" => Self::Ogg,
            "wav" | "wave" => Self::Wav,
            "mp3" | "mpeg" => Self::Mp3,
            _ => Self::default(),
        }
    }
}

/// Base STT configuration shared by all providers.
#[derive(Debug, Clone)]
pub struct STTConfig {
    /// Provider API key
    pub api_key: String,
    /// Provider model identifier
    pub model: String,
    /// Target transcription language (ISO 639-1). Output is forced into
    /// this language regardless of the language spoken; a mismatch between
    /// spoken and target language is not an error.
    pub language: String,
    /// Container format of incoming utterance buffers
    pub audio_format: AudioInputFormat,
    /// Endpoint override (tests, proxies); provider default when `None`
    pub api_url: Option<String>,
}

impl Default for STTConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "whisper-1".to_string(),
            language: "en".to_string(),
            audio_format: AudioInputFormat::default(),
            api_url: None,
        }
    }
}

/// Trait implemented by speech-to-text providers.
#[async_trait]
pub trait BaseSTT: Send + Sync {
    /// Transcribe one complete utterance to text.
    ///
    /// Returns the transcript verbatim; callers decide what to do with an
    /// empty or whitespace-only result.
    async fn transcribe(&self, audio: Bytes) -> STTResult<String>;

    /// Short provider identifier for logs.
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_input_format_parsing() {
        assert_eq!(AudioInputFormat::from_str_or_default("webm"), AudioInputFormat::Webm);
        assert_eq!(AudioInputFormat::from_str_or_default("OGG"), AudioInputFormat::Ogg);
        assert_eq!(AudioInputFormat::from_str_or_default("wav"), AudioInputFormat::Wav);
        assert_eq!(AudioInputFormat::from_str_or_default("mp3"), AudioInputFormat::Mp3);
        assert_eq!(
            AudioInputFormat::from_str_or_default("unknown"),
            AudioInputFormat::Webm
        );
    }

    #[test]
    fn test_audio_input_format_mime_and_name_agree() {
        for format in [
            AudioInputFormat::Webm,
            AudioInputFormat::Ogg,
            AudioInputFormat::Wav,
            AudioInputFormat::Mp3,
        ] {
            let extension = format.file_name().rsplit('.').next().unwrap();
            assert!(!format.mime_type().is_empty());
            assert!(!extension.is_empty());
        }
    }

    #[test]
    fn test_default_config() {
        let config = STTConfig::default();
        assert_eq!(config.model, "whisper-1");
        assert_eq!(config.language, "en");
        assert!(config.api_url.is_none());
    }
}

//! Base trait and shared types for speech synthesis providers.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result type for TTS operations.
pub type TTSResult<T> = Result<T, TTSError>;

/// Errors produced by TTS providers.
#[derive(Debug, thiserror::Error)]
pub enum TTSError {
    /// API key missing or rejected
    #[error("TTS authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The provider rejected the request due to rate limiting
    #[error("TTS rate limited: {0}")]
    RateLimited(String),

    /// Request could not be sent or the response could not be read
    #[error("TTS network error: {0}")]
    NetworkError(String),

    /// The provider returned an error response or unusable audio
    #[error("TTS provider error: {0}")]
    ProviderError(String),

    /// Provider configuration was invalid
    #[error("TTS configuration error: {0}")]
    ConfigurationError(String),
}

/// Audio container format of synthesized replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutputFormat {
    /// MP3 - broad playback support, the default reply format
    #[default]
    Mp3,
    /// Opus in an Ogg container
    Opus,
    /// AAC
    Aac,
    /// FLAC (lossless)
    Flac,
    /// WAV (PCM with header)
    Wav,
    /// Raw PCM, 24 kHz 16-bit mono
    Pcm,
}

impl AudioOutputFormat {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }

    /// Content type used when serving the stored artifact.
    #[inline]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Pcm => "application/octet-stream",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "mp3" | "mpeg" => Self::Mp3,
            "opus" | "ogg" => Self::Opus,
            "aac" => Self::Aac,
            "flac" => Self::Flac,
            "wav" | "wave" => Self::Wav,
            "pcm" | "linear16" => Self::Pcm,
            _ => Self::default(),
        }
    }
}

/// Base TTS configuration shared by all providers.
#[derive(Debug, Clone)]
pub struct TTSConfig {
    /// Provider API key
    pub api_key: String,
    /// Provider model identifier
    pub model: String,
    /// Voice identifier
    pub voice_id: Option<String>,
    /// Output audio container format
    pub audio_format: AudioOutputFormat,
    /// Speaking speed multiplier; provider default when `None`
    pub speaking_rate: Option<f32>,
    /// Endpoint override (tests, proxies); provider default when `None`
    pub api_url: Option<String>,
}

impl Default for TTSConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "tts-1".to_string(),
            voice_id: None,
            audio_format: AudioOutputFormat::default(),
            speaking_rate: None,
            api_url: None,
        }
    }
}

/// Trait implemented by speech synthesis providers.
#[async_trait]
pub trait BaseTTS: Send + Sync {
    /// Synthesize the given text into one complete audio buffer.
    async fn synthesize(&self, text: &str) -> TTSResult<Bytes>;

    /// Output format the provider is configured to produce.
    fn output_format(&self) -> AudioOutputFormat;

    /// Short provider identifier for logs.
    fn provider_name(&self) -> &'static str;
}

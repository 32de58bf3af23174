//! OpenAI TTS provider implementation.
//!
//! # API Reference
//!
//! - Endpoint: `POST https://api.openai.com/v1/audio/speech`
//! - Models: tts-1, tts-1-hd, gpt-4o-mini-tts
//! - Voices: alloy, ash, ballad, coral, echo, fable, onyx, nova, sage, shimmer, verse
//! - Output: mp3, opus, aac, flac, wav, pcm (24kHz)
//! - Speed: 0.25 to 4.0

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::super::base::{AudioOutputFormat, BaseTTS, TTSConfig, TTSError, TTSResult};
use super::config::{OpenAITTSModel, OpenAIVoice};

/// OpenAI TTS API endpoint
pub const OPENAI_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Request timeout for speech synthesis.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TtsErrorResponse {
    error: TtsErrorDetail,
}

#[derive(Debug, Deserialize)]
struct TtsErrorDetail {
    message: String,
    #[serde(rename = "type", default)]
    error_type: String,
}

/// OpenAI TTS provider implementing the [`BaseTTS`] trait.
///
/// # Example
///
/// ```rust,no_run
/// use solace_gateway::core::tts::{BaseTTS, OpenAITTS, TTSConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TTSConfig {
///     api_key: "sk-...".to_string(),
///     voice_id: Some("shimmer".to_string()),
///     ..Default::default()
/// };
///
/// let tts = OpenAITTS::new(config)?;
/// let audio = tts.synthesize("Hello, world!").await?;
/// println!("Synthesized {} bytes", audio.len());
/// # Ok(())
/// # }
/// ```
pub struct OpenAITTS {
    config: TTSConfig,
    /// Parsed OpenAI model
    model: OpenAITTSModel,
    /// Parsed OpenAI voice
    voice: OpenAIVoice,
    /// Speaking speed (0.25 to 4.0)
    speed: f32,
    /// HTTP client reused across requests (connection pooling)
    http_client: Client,
}

impl OpenAITTS {
    /// Create a new OpenAI TTS instance.
    pub fn new(config: TTSConfig) -> TTSResult<Self> {
        if config.api_key.is_empty() {
            return Err(TTSError::AuthenticationFailed(
                "API key is required for OpenAI TTS".to_string(),
            ));
        }

        let model = if config.model.is_empty() {
            OpenAITTSModel::default()
        } else {
            OpenAITTSModel::from_str_or_default(&config.model)
        };

        let voice = if let Some(ref voice_id) = config.voice_id {
            OpenAIVoice::from_str_or_default(voice_id)
        } else {
            OpenAIVoice::default()
        };

        let speed = config.speaking_rate.unwrap_or(1.0).clamp(0.25, 4.0);

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                TTSError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            model,
            voice,
            speed,
            http_client,
        })
    }

    /// Get the configured model.
    pub fn model(&self) -> OpenAITTSModel {
        self.model
    }

    /// Get the configured voice.
    pub fn voice(&self) -> OpenAIVoice {
        self.voice
    }

    fn api_url(&self) -> &str {
        self.config.api_url.as_deref().unwrap_or(OPENAI_TTS_URL)
    }

    fn build_body(&self, text: &str) -> serde_json::Value {
        let mut body = json!({
            "model": self.model.as_str(),
            "input": text,
            "voice": self.voice.as_str(),
            "response_format": self.config.audio_format.as_str(),
        });

        // Add speed if not default (1.0)
        if (self.speed - 1.0).abs() > 0.001 {
            body["speed"] = json!(self.speed);
        }

        body
    }
}

#[async_trait::async_trait]
impl BaseTTS for OpenAITTS {
    async fn synthesize(&self, text: &str) -> TTSResult<Bytes> {
        if text.trim().is_empty() {
            return Err(TTSError::ConfigurationError(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        debug!(
            characters = text.len(),
            voice = %self.voice,
            "Requesting speech synthesis"
        );

        let response = self
            .http_client
            .post(self.api_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&self.build_body(text))
            .send()
            .await
            .map_err(|e| TTSError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let response_text = response
                .text()
                .await
                .map_err(|e| TTSError::NetworkError(format!("Failed to read response: {e}")))?;

            let error_msg = if let Ok(error_response) =
                serde_json::from_str::<TtsErrorResponse>(&response_text)
            {
                format!(
                    "OpenAI API error: {} ({})",
                    error_response.error.message, error_response.error.error_type
                )
            } else {
                format!("OpenAI API error ({status}): {response_text}")
            };

            return Err(match status.as_u16() {
                401 => TTSError::AuthenticationFailed(error_msg),
                429 => TTSError::RateLimited(error_msg),
                _ => TTSError::ProviderError(error_msg),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TTSError::NetworkError(format!("Failed to read audio body: {e}")))?;

        if audio.is_empty() {
            return Err(TTSError::ProviderError(
                "Synthesis returned an empty audio body".to_string(),
            ));
        }

        Ok(audio)
    }

    fn output_format(&self) -> AudioOutputFormat {
        self.config.audio_format
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_tts_creation() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            voice_id: Some("nova".to_string()),
            model: "tts-1-hd".to_string(),
            audio_format: AudioOutputFormat::Mp3,
            speaking_rate: Some(1.2),
            api_url: None,
        };

        let tts = OpenAITTS::new(config).unwrap();
        assert_eq!(tts.model(), OpenAITTSModel::Tts1Hd);
        assert_eq!(tts.voice(), OpenAIVoice::Nova);
        assert_eq!(tts.output_format(), AudioOutputFormat::Mp3);
    }

    #[test]
    fn test_openai_tts_default_values() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };

        let tts = OpenAITTS::new(config).unwrap();
        assert_eq!(tts.model(), OpenAITTSModel::Tts1);
        assert_eq!(tts.voice(), OpenAIVoice::Shimmer);
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = OpenAITTS::new(TTSConfig::default());
        assert!(matches!(result, Err(TTSError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_request_body() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            voice_id: Some("shimmer".to_string()),
            speaking_rate: Some(1.5),
            ..Default::default()
        };
        let tts = OpenAITTS::new(config).unwrap();

        let body = tts.build_body("Hello world");
        assert_eq!(body["model"], "tts-1");
        assert_eq!(body["input"], "Hello world");
        assert_eq!(body["voice"], "shimmer");
        assert_eq!(body["response_format"], "mp3");
        assert!((body["speed"].as_f64().unwrap() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_default_speed_omitted() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        let tts = OpenAITTS::new(config).unwrap();
        assert!(tts.build_body("hi").get("speed").is_none());
    }

    #[test]
    fn test_speed_clamping() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            speaking_rate: Some(0.1),
            ..Default::default()
        };
        let tts = OpenAITTS::new(config).unwrap();
        assert!((tts.speed - 0.25).abs() < 0.001);

        let config = TTSConfig {
            api_key: "test_key".to_string(),
            speaking_rate: Some(5.0),
            ..Default::default()
        };
        let tts = OpenAITTS::new(config).unwrap();
        assert!((tts.speed - 4.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let config = TTSConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        let tts = OpenAITTS::new(config).unwrap();
        let result = tts.synthesize("   ").await;
        assert!(matches!(result, Err(TTSError::ConfigurationError(_))));
    }
}

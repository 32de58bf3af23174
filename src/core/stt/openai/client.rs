//! OpenAI STT (Whisper) client implementation.
//!
//! Whisper is a REST API, which fits this gateway's per-utterance model
//! directly: the transport hands over one finalized utterance buffer, the
//! client uploads it as a multipart form and returns the transcript. The
//! transcription language is pinned to the configured target language, so
//! output is forced into that language regardless of what was spoken.

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info};

use super::super::base::{AudioInputFormat, BaseSTT, STTConfig, STTError, STTResult};
use super::config::OpenAISTTModel;
use super::messages::{OpenAIErrorResponse, TranscriptionResponse};

/// OpenAI audio transcription API endpoint
pub const OPENAI_STT_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Maximum accepted utterance size (20 MB). Slightly below the 25 MB OpenAI
/// upload limit to leave headroom for the multipart envelope.
const MAX_UTTERANCE_SIZE_BYTES: usize = 20 * 1024 * 1024;

/// Request timeout. Whisper can take a while on long utterances.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// OpenAI Whisper STT client implementing the [`BaseSTT`] trait.
///
/// # Example
///
/// ```rust,no_run
/// use solace_gateway::core::stt::{BaseSTT, OpenAISTT, STTConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = STTConfig {
///     api_key: "sk-...".to_string(),
///     language: "en".to_string(),
///     ..Default::default()
/// };
///
/// let stt = OpenAISTT::new(config)?;
/// let transcript = stt.transcribe(vec![0u8; 1024].into()).await?;
/// println!("Transcript: {transcript}");
/// # Ok(())
/// # }
/// ```
pub struct OpenAISTT {
    config: STTConfig,
    /// Parsed model identifier
    model: OpenAISTTModel,
    /// HTTP client reused across requests (connection pooling)
    http_client: Client,
}

impl OpenAISTT {
    /// Create a new OpenAI STT client.
    pub fn new(config: STTConfig) -> STTResult<Self> {
        if config.api_key.is_empty() {
            return Err(STTError::AuthenticationFailed(
                "API key is required for OpenAI STT".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                STTError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        let model = OpenAISTTModel::from_str_or_default(&config.model);

        Ok(Self {
            config,
            model,
            http_client,
        })
    }

    /// The configured model.
    pub fn model(&self) -> OpenAISTTModel {
        self.model
    }

    fn api_url(&self) -> &str {
        self.config.api_url.as_deref().unwrap_or(OPENAI_STT_URL)
    }

    fn build_form(&self, audio: Bytes) -> STTResult<Form> {
        let format: AudioInputFormat = self.config.audio_format;
        let file_part = Part::stream(reqwest::Body::from(audio))
            .file_name(format.file_name())
            .mime_str(format.mime_type())
            .map_err(|e| STTError::ConfigurationError(format!("Invalid MIME type: {e}")))?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", self.model.as_str().to_string())
            .text("response_format", "json".to_string());

        if !self.config.language.is_empty() {
            form = form.text("language", self.config.language.clone());
        }

        Ok(form)
    }
}

#[async_trait::async_trait]
impl BaseSTT for OpenAISTT {
    async fn transcribe(&self, audio: Bytes) -> STTResult<String> {
        if audio.is_empty() {
            return Err(STTError::AudioProcessingError(
                "Utterance buffer is empty".to_string(),
            ));
        }
        if audio.len() > MAX_UTTERANCE_SIZE_BYTES {
            return Err(STTError::AudioProcessingError(format!(
                "Utterance buffer ({} bytes) exceeds maximum upload size ({} bytes)",
                audio.len(),
                MAX_UTTERANCE_SIZE_BYTES
            )));
        }

        debug!(
            bytes = audio.len(),
            language = %self.config.language,
            "Sending utterance to OpenAI transcription API"
        );

        let form = self.build_form(audio)?;
        let response = self
            .http_client
            .post(self.api_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| STTError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| STTError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error_msg = if let Ok(error_response) =
                serde_json::from_str::<OpenAIErrorResponse>(&response_text)
            {
                format!(
                    "OpenAI API error: {} ({})",
                    error_response.error.message, error_response.error.error_type
                )
            } else {
                format!("OpenAI API error ({status}): {response_text}")
            };

            return Err(if status.as_u16() == 401 {
                STTError::AuthenticationFailed(error_msg)
            } else {
                STTError::ProviderError(error_msg)
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&response_text)
            .map_err(|e| STTError::ProviderError(format!("Failed to parse response: {e}")))?;

        info!(
            characters = parsed.text.len(),
            "Transcription complete"
        );

        Ok(parsed.text)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = STTConfig {
            api_key: "test_key".to_string(),
            model: "whisper-1".to_string(),
            ..Default::default()
        };
        let stt = OpenAISTT::new(config).unwrap();
        assert_eq!(stt.model(), OpenAISTTModel::Whisper1);
        assert_eq!(stt.provider_name(), "openai");
        assert_eq!(stt.api_url(), OPENAI_STT_URL);
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = OpenAISTT::new(STTConfig::default());
        assert!(matches!(result, Err(STTError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_api_url_override() {
        let config = STTConfig {
            api_key: "test_key".to_string(),
            api_url: Some("http://localhost:9999/v1/audio/transcriptions".to_string()),
            ..Default::default()
        };
        let stt = OpenAISTT::new(config).unwrap();
        assert_eq!(stt.api_url(), "http://localhost:9999/v1/audio/transcriptions");
    }

    #[tokio::test]
    async fn test_empty_utterance_rejected() {
        let config = STTConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };
        let stt = OpenAISTT::new(config).unwrap();
        let result = stt.transcribe(Bytes::new()).await;
        assert!(matches!(result, Err(STTError::AudioProcessingError(_))));
    }
}

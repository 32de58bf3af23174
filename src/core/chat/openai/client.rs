//! OpenAI chat completions client implementation.
//!
//! Posts the full role-tagged conversation transcript to the chat
//! completions endpoint and extracts the first choice's message content.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::super::base::{BaseChat, ChatConfig, ChatError, ChatResult};
use crate::core::session::Turn;

/// OpenAI chat completions API endpoint
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Request timeout for reply generation.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorResponse {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
    #[serde(rename = "type", default)]
    error_type: String,
}

/// OpenAI chat completions client implementing the [`BaseChat`] trait.
pub struct OpenAIChat {
    config: ChatConfig,
    http_client: Client,
}

impl OpenAIChat {
    /// Create a new OpenAI chat client.
    pub fn new(config: ChatConfig) -> ChatResult<Self> {
        if config.api_key.is_empty() {
            return Err(ChatError::AuthenticationFailed(
                "API key is required for OpenAI chat".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                ChatError::ConfigurationError(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn api_url(&self) -> &str {
        self.config.api_url.as_deref().unwrap_or(OPENAI_CHAT_URL)
    }

    fn build_body(&self, history: &[Turn]) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = history
            .iter()
            .map(|turn| {
                json!({
                    "role": turn.role.as_str(),
                    "content": turn.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });

        if let Some(temperature) = self.config.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

#[async_trait::async_trait]
impl BaseChat for OpenAIChat {
    async fn generate(&self, history: &[Turn]) -> ChatResult<String> {
        if history.is_empty() {
            return Err(ChatError::ConfigurationError(
                "Cannot generate a reply from an empty transcript".to_string(),
            ));
        }

        debug!(
            turns = history.len(),
            model = %self.config.model,
            "Requesting reply completion"
        );

        let response = self
            .http_client
            .post(self.api_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&self.build_body(history))
            .send()
            .await
            .map_err(|e| ChatError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChatError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error_msg = if let Ok(error_response) =
                serde_json::from_str::<ChatErrorResponse>(&response_text)
            {
                format!(
                    "OpenAI API error: {} ({})",
                    error_response.error.message, error_response.error.error_type
                )
            } else {
                format!("OpenAI API error ({status}): {response_text}")
            };

            return Err(match status.as_u16() {
                401 => ChatError::AuthenticationFailed(error_msg),
                429 => ChatError::RateLimited(error_msg),
                _ => ChatError::ProviderError(error_msg),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::ProviderError(format!("Failed to parse response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ChatError::ProviderError("Completion contained no message content".to_string())
            })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::Turn;

    fn test_client() -> OpenAIChat {
        OpenAIChat::new(ChatConfig {
            api_key: "test_key".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.7),
            api_url: None,
        })
        .unwrap()
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let result = OpenAIChat::new(ChatConfig::default());
        assert!(matches!(result, Err(ChatError::AuthenticationFailed(_))));
    }

    #[test]
    fn test_body_carries_full_history_in_order() {
        let client = test_client();
        let history = vec![
            Turn::system("persona"),
            Turn::user("I feel anxious today"),
            Turn::assistant("That sounds hard."),
            Turn::user("It is."),
        ];

        let body = client.build_body(&history);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "I feel anxious today");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[3]["role"], "user");
        assert_eq!(body["model"], "gpt-4o-mini");
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_body_omits_temperature_when_unset() {
        let client = OpenAIChat::new(ChatConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        })
        .unwrap();
        let body = client.build_body(&[Turn::system("persona")]);
        assert!(body.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_empty_history_rejected() {
        let client = test_client();
        let result = client.generate(&[]).await;
        assert!(matches!(result, Err(ChatError::ConfigurationError(_))));
    }

    #[test]
    fn test_parse_completion_response() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Take a slow breath."}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("Take a slow breath.")
        );
    }
}

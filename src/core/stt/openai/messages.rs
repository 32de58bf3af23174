//! Response types for the OpenAI Audio Transcription API.

use serde::Deserialize;

/// Successful transcription response (`response_format=json`).
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    /// The transcribed text
    pub text: String,
}

/// Error envelope returned by the OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIErrorDetail,
}

/// Error payload inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcription_response() {
        let json = r#"{"text": "I feel anxious today"}"#;
        let response: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text, "I feel anxious today");
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"error": {"message": "Invalid file format.", "type": "invalid_request_error"}}"#;
        let response: OpenAIErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.error.message, "Invalid file format.");
        assert_eq!(response.error.error_type, "invalid_request_error");
    }

    #[test]
    fn test_parse_error_response_without_type() {
        let json = r#"{"error": {"message": "boom"}}"#;
        let response: OpenAIErrorResponse = serde_json::from_str(json).unwrap();
        assert!(response.error.error_type.is_empty());
    }
}

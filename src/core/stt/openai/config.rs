//! Configuration types for the OpenAI Audio Transcription API.

use serde::{Deserialize, Serialize};

/// Supported OpenAI transcription models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenAISTTModel {
    /// Whisper large - the default batch transcription model
    #[default]
    #[serde(rename = "whisper-1")]
    Whisper1,
    /// GPT-4o transcription model - higher accuracy
    #[serde(rename = "gpt-4o-transcribe")]
    Gpt4oTranscribe,
    /// GPT-4o mini transcription model - lower latency
    #[serde(rename = "gpt-4o-mini-transcribe")]
    Gpt4oMiniTranscribe,
}

impl OpenAISTTModel {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Whisper1 => "whisper-1",
            Self::Gpt4oTranscribe => "gpt-4o-transcribe",
            Self::Gpt4oMiniTranscribe => "gpt-4o-mini-transcribe",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "whisper-1" | "whisper1" | "whisper" => Self::Whisper1,
            "gpt-4o-transcribe" => Self::Gpt4oTranscribe,
            "gpt-4o-mini-transcribe" => Self::Gpt4oMiniTranscribe,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for OpenAISTTModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_round_trip() {
        for model in [
            OpenAISTTModel::Whisper1,
            OpenAISTTModel::Gpt4oTranscribe,
            OpenAISTTModel::Gpt4oMiniTranscribe,
        ] {
            assert_eq!(OpenAISTTModel::from_str_or_default(model.as_str()), model);
        }
    }

    #[test]
    fn test_unknown_model_falls_back() {
        assert_eq!(
            OpenAISTTModel::from_str_or_default("bogus"),
            OpenAISTTModel::Whisper1
        );
    }
}

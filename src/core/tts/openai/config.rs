//! Configuration types for the OpenAI speech synthesis API.
//!
//! - Model selection (tts-1, tts-1-hd, gpt-4o-mini-tts)
//! - Voice selection (11 available voices)

use serde::{Deserialize, Serialize};

/// Supported OpenAI TTS models.
///
/// - `tts-1`: Standard quality, lower latency
/// - `tts-1-hd`: High definition quality, higher latency
/// - `gpt-4o-mini-tts`: Latest model with improved quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpenAITTSModel {
    /// Standard quality TTS model - good balance of quality and latency
    #[default]
    #[serde(rename = "tts-1")]
    Tts1,
    /// High definition TTS model - best quality, higher latency
    #[serde(rename = "tts-1-hd")]
    Tts1Hd,
    /// GPT-4o mini TTS model - latest improvements
    #[serde(rename = "gpt-4o-mini-tts")]
    Gpt4oMiniTts,
}

impl OpenAITTSModel {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tts1 => "tts-1",
            Self::Tts1Hd => "tts-1-hd",
            Self::Gpt4oMiniTts => "gpt-4o-mini-tts",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "tts-1" | "tts1" => Self::Tts1,
            "tts-1-hd" | "tts1-hd" | "tts1hd" => Self::Tts1Hd,
            "gpt-4o-mini-tts" | "gpt4o-mini-tts" => Self::Gpt4oMiniTts,
            _ => Self::default(),
        }
    }
}

impl std::fmt::Display for OpenAITTSModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Available voices for OpenAI TTS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenAIVoice {
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Fable,
    Onyx,
    Nova,
    Sage,
    /// Soft, natural-sounding voice; the gateway default
    #[default]
    Shimmer,
    Verse,
}

impl OpenAIVoice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse from string, with fallback to default.
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "alloy" => Self::Alloy,
            "ash" => Self::Ash,
            "ballad" => Self::Ballad,
            "coral" => Self::Coral,
            "echo" => Self::Echo,
            "fable" => Self::Fable,
            "onyx" => Self::Onyx,
            "nova" => Self::Nova,
            "sage" => Self::Sage,
            "shimmer" => Self::Shimmer,
            "verse" => Self::Verse,
            _ => Self::default(),
        }
    }

    /// Get all available voices.
    pub fn all() -> &'static [OpenAIVoice] {
        &[
            Self::Alloy,
            Self::Ash,
            Self::Ballad,
            Self::Coral,
            Self::Echo,
            Self::Fable,
            Self::Onyx,
            Self::Nova,
            Self::Sage,
            Self::Shimmer,
            Self::Verse,
        ]
    }
}

impl std::fmt::Display for OpenAIVoice {
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
            OpenAITTSModel::Tts1,
            OpenAITTSModel::Tts1Hd,
            OpenAITTSModel::Gpt4oMiniTts,
        ] {
            assert_eq!(OpenAITTSModel::from_str_or_default(model.as_str()), model);
        }
    }

    #[test]
    fn test_voice_round_trip() {
        for voice in OpenAIVoice::all() {
            assert_eq!(OpenAIVoice::from_str_or_default(voice.as_str()), *voice);
        }
    }

    #[test]
    fn test_default_voice_is_shimmer() {
        assert_eq!(OpenAIVoice::default(), OpenAIVoice::Shimmer);
        assert_eq!(OpenAIVoice::from_str_or_default("bogus"), OpenAIVoice::Shimmer);
    }
}

use serde::Deserialize;
use std::path::Path;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a
/// YAML file. All fields are optional to allow partial configuration;
/// environment variables provide the base values that YAML overrides.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5000
///
/// providers:
///   openai_api_key: "sk-..."
///
/// pipeline:
///   reply_language: "en"
///   persona: "You are a warm, attentive conversational agent."
///   stt:
///     model: "whisper-1"
///     audio_format: "webm"
///   chat:
///     model: "gpt-4o-mini"
///     temperature: 0.7
///   tts:
///     model: "tts-1"
///     voice: "shimmer"
///     audio_format: "mp3"
///
/// artifacts:
///   ttl_seconds: 900
///   max_bytes: 268435456
///
/// security:
///   cors_allowed_origins: "http://localhost:5173"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
///   max_websocket_connections: 1024
///   max_connections_per_ip: 100
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub providers: Option<ProvidersYaml>,
    pub pipeline: Option<PipelineYaml>,
    pub artifacts: Option<ArtifactsYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Provider API keys from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    /// OpenAI API key used by the transcription, reply generation and
    /// speech synthesis clients
    pub openai_api_key: Option<String>,
}

/// Conversation pipeline configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineYaml {
    /// Language the agent replies in, and the language transcription is
    /// forced to (ISO 639-1)
    pub reply_language: Option<String>,
    /// Agent persona seeded as the conversation's system turn
    pub persona: Option<String>,
    pub stt: Option<SttYaml>,
    pub chat: Option<ChatYaml>,
    pub tts: Option<TtsYaml>,
}

/// Transcription stage configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SttYaml {
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Container format of the utterance frames the client transmits
    /// (webm, ogg, wav, mp3)
    pub audio_format: Option<String>,
    /// Endpoint override, mainly for testing against mock backends
    pub api_url: Option<String>,
}

/// Reply generation stage configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ChatYaml {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub api_url: Option<String>,
}

/// Speech synthesis stage configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub audio_format: Option<String>,
    pub speaking_rate: Option<f32>,
    pub api_url: Option<String>,
}

/// Reply artifact retention configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ArtifactsYaml {
    /// Retention window for synthesized reply audio, in seconds
    pub ttl_seconds: Option<u64>,
    /// Upper bound on total bytes of retained reply audio
    pub max_bytes: Option<u64>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
    pub max_websocket_connections: Option<usize>,
    pub max_connections_per_ip: Option<u32>,
}

/// Load and parse a YAML configuration file.
pub fn load_yaml_config(path: &Path) -> Result<YamlConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
    let config: YamlConfig = serde_yaml::from_str(&contents)
        .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))?;
    Ok(config)
}

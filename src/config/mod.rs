//! Configuration module for the Solace Gateway server
//!
//! This module handles server configuration from various sources: .env files,
//! YAML files, and environment variables. Priority: YAML > ENV vars > .env
//! values > defaults.
//!
//! # Example
//! ```rust,no_run
//! use solace_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable base
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

mod yaml;

pub use yaml::YamlConfig;

/// Default agent persona seeded as the conversation's system turn.
///
/// The output-language constraint is appended separately from
/// `reply_language`, so changing the language does not require rewriting
/// the persona text.
pub const DEFAULT_PERSONA: &str = "You are a warm, empathetic and attentive conversational agent. \
     Have a natural, flowing conversation: speak like a real person, validate \
     the user's feelings, and ask gentle follow-up questions. Keep your \
     responses concise (one to three sentences) to maintain a back-and-forth \
     dialogue. Do not lecture.";

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the Solace Gateway server:
/// - Server settings (host, port, TLS)
/// - Provider API key and per-stage pipeline settings (STT, chat, TTS)
/// - Agent persona and reply language
/// - Reply artifact retention
/// - Security settings (CORS, rate limiting, connection limits)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// OpenAI API key shared by the transcription, reply generation and
    /// speech synthesis clients
    pub openai_api_key: Option<String>,

    // Transcription stage
    pub stt_provider: String,
    pub stt_model: String,
    /// Container format of the utterance frames the client transmits
    pub stt_audio_format: String,
    /// Endpoint override for the transcription API (tests, proxies)
    pub stt_api_url: Option<String>,

    // Reply generation stage
    pub chat_provider: String,
    pub chat_model: String,
    pub chat_temperature: Option<f32>,
    /// Endpoint override for the chat completions API (tests, proxies)
    pub chat_api_url: Option<String>,

    // Speech synthesis stage
    pub tts_provider: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_audio_format: String,
    pub tts_speaking_rate: Option<f32>,
    /// Endpoint override for the speech synthesis API (tests, proxies)
    pub tts_api_url: Option<String>,

    /// Language the agent replies in; transcription output is forced to
    /// this language regardless of the language spoken (ISO 639-1)
    pub reply_language: String,
    /// Agent persona seeded as the conversation's system turn
    pub persona: String,

    // Reply artifact retention
    /// Retention window for synthesized reply audio, in seconds
    pub artifact_ttl_seconds: u64,
    /// Upper bound on total bytes of retained reply audio
    pub artifact_max_bytes: u64,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,

    /// Maximum concurrent WebSocket connections
    /// Default: None (unlimited)
    pub max_websocket_connections: Option<usize>,
    /// Maximum connections per IP address
    /// Default: 100
    pub max_connections_per_ip: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            tls: None,
            openai_api_key: None,
            stt_provider: "openai".to_string(),
            stt_model: "whisper-1".to_string(),
            stt_audio_format: "webm".to_string(),
            stt_api_url: None,
            chat_provider: "openai".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            chat_temperature: None,
            chat_api_url: None,
            tts_provider: "openai".to_string(),
            tts_model: "tts-1".to_string(),
            tts_voice: "shimmer".to_string(),
            tts_audio_format: "mp3".to_string(),
            tts_speaking_rate: None,
            tts_api_url: None,
            reply_language: "en".to_string(),
            persona: DEFAULT_PERSONA.to_string(),
            artifact_ttl_seconds: 900,
            artifact_max_bytes: 256 * 1024 * 1024,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
            max_websocket_connections: None,
            max_connections_per_ip: 100,
        }
    }
}

/// Implement Drop to zeroize the API key when ServerConfig is dropped,
/// clearing the secret from memory after use.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (with .env values
    /// already merged into the process environment by the caller).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base.
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();
        config.apply_env()?;
        config.apply_yaml(yaml::load_yaml_config(path)?);
        config.validate()?;
        Ok(config)
    }

    /// The socket address string the server binds to.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether TLS is configured and should be used.
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// The seed system turn for a new conversation: persona plus the
    /// output-language constraint.
    pub fn seed_prompt(&self) -> String {
        format!(
            "{} You must always respond only in {}, no matter what language \
             the user speaks. If the user speaks in another language, \
             understand their message but respond in {}.",
            self.persona,
            language_name(&self.reply_language),
            language_name(&self.reply_language),
        )
    }

    fn apply_env(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Ok(host) = std::env::var("HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.port = port
                .parse()
                .map_err(|e| format!("invalid PORT value '{port}': {e}"))?;
        }

        let cert = std::env::var("TLS_CERT_PATH").ok();
        let key = std::env::var("TLS_KEY_PATH").ok();
        match (cert, key) {
            (Some(cert_path), Some(key_path)) => {
                self.tls = Some(TlsConfig {
                    cert_path: PathBuf::from(cert_path),
                    key_path: PathBuf::from(key_path),
                });
            }
            (None, None) => {}
            _ => {
                return Err(
                    "TLS_CERT_PATH and TLS_KEY_PATH must both be set to enable TLS".into(),
                );
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }

        if let Ok(model) = std::env::var("STT_MODEL") {
            self.stt_model = model;
        }
        if let Ok(format) = std::env::var("STT_AUDIO_FORMAT") {
            self.stt_audio_format = format;
        }
        if let Ok(model) = std::env::var("CHAT_MODEL") {
            self.chat_model = model;
        }
        if let Ok(temp) = std::env::var("CHAT_TEMPERATURE") {
            self.chat_temperature = Some(
                temp.parse()
                    .map_err(|e| format!("invalid CHAT_TEMPERATURE value '{temp}': {e}"))?,
            );
        }
        if let Ok(model) = std::env::var("TTS_MODEL") {
            self.tts_model = model;
        }
        if let Ok(voice) = std::env::var("TTS_VOICE") {
            self.tts_voice = voice;
        }
        if let Ok(format) = std::env::var("TTS_AUDIO_FORMAT") {
            self.tts_audio_format = format;
        }

        if let Ok(language) = std::env::var("REPLY_LANGUAGE") {
            self.reply_language = language;
        }
        if let Ok(persona) = std::env::var("AGENT_PERSONA") {
            self.persona = persona;
        }

        if let Ok(ttl) = std::env::var("ARTIFACT_TTL_SECONDS") {
            self.artifact_ttl_seconds = ttl
                .parse()
                .map_err(|e| format!("invalid ARTIFACT_TTL_SECONDS value '{ttl}': {e}"))?;
        }

        if let Ok(origins) = std::env::var("CORS_ALLOWED_ORIGINS") {
            self.cors_allowed_origins = Some(origins);
        }
        if let Ok(rps) = std::env::var("RATE_LIMIT_REQUESTS_PER_SECOND") {
            self.rate_limit_requests_per_second = rps.parse().map_err(|e| {
                format!("invalid RATE_LIMIT_REQUESTS_PER_SECOND value '{rps}': {e}")
            })?;
        }
        if let Ok(max) = std::env::var("MAX_WEBSOCKET_CONNECTIONS") {
            self.max_websocket_connections = Some(
                max.parse()
                    .map_err(|e| format!("invalid MAX_WEBSOCKET_CONNECTIONS value '{max}': {e}"))?,
            );
        }
        if let Ok(max) = std::env::var("MAX_CONNECTIONS_PER_IP") {
            self.max_connections_per_ip = max
                .parse()
                .map_err(|e| format!("invalid MAX_CONNECTIONS_PER_IP value '{max}': {e}"))?;
        }

        Ok(())
    }

    fn apply_yaml(&mut self, yaml: YamlConfig) {
        if let Some(server) = yaml.server {
            if let Some(host) = server.host {
                self.host = host;
            }
            if let Some(port) = server.port {
                self.port = port;
            }
            if let Some(tls) = server.tls
                && tls.enabled.unwrap_or(true)
                && let (Some(cert_path), Some(key_path)) = (tls.cert_path, tls.key_path)
            {
                self.tls = Some(TlsConfig {
                    cert_path: PathBuf::from(cert_path),
                    key_path: PathBuf::from(key_path),
                });
            }
        }

        if let Some(providers) = yaml.providers
            && let Some(key) = providers.openai_api_key
        {
            self.openai_api_key = Some(key);
        }

        if let Some(pipeline) = yaml.pipeline {
            if let Some(language) = pipeline.reply_language {
                self.reply_language = language;
            }
            if let Some(persona) = pipeline.persona {
                self.persona = persona;
            }
            if let Some(stt) = pipeline.stt {
                if let Some(provider) = stt.provider {
                    self.stt_provider = provider;
                }
                if let Some(model) = stt.model {
                    self.stt_model = model;
                }
                if let Some(format) = stt.audio_format {
                    self.stt_audio_format = format;
                }
                if let Some(url) = stt.api_url {
                    self.stt_api_url = Some(url);
                }
            }
            if let Some(chat) = pipeline.chat {
                if let Some(provider) = chat.provider {
                    self.chat_provider = provider;
                }
                if let Some(model) = chat.model {
                    self.chat_model = model;
                }
                if let Some(temperature) = chat.temperature {
                    self.chat_temperature = Some(temperature);
                }
                if let Some(url) = chat.api_url {
                    self.chat_api_url = Some(url);
                }
            }
            if let Some(tts) = pipeline.tts {
                if let Some(provider) = tts.provider {
                    self.tts_provider = provider;
                }
                if let Some(model) = tts.model {
                    self.tts_model = model;
                }
                if let Some(voice) = tts.voice {
                    self.tts_voice = voice;
                }
                if let Some(format) = tts.audio_format {
                    self.tts_audio_format = format;
                }
                if let Some(rate) = tts.speaking_rate {
                    self.tts_speaking_rate = Some(rate);
                }
                if let Some(url) = tts.api_url {
                    self.tts_api_url = Some(url);
                }
            }
        }

        if let Some(artifacts) = yaml.artifacts {
            if let Some(ttl) = artifacts.ttl_seconds {
                self.artifact_ttl_seconds = ttl;
            }
            if let Some(max_bytes) = artifacts.max_bytes {
                self.artifact_max_bytes = max_bytes;
            }
        }

        if let Some(security) = yaml.security {
            if let Some(origins) = security.cors_allowed_origins {
                self.cors_allowed_origins = Some(origins);
            }
            if let Some(rps) = security.rate_limit_requests_per_second {
                self.rate_limit_requests_per_second = rps;
            }
            if let Some(burst) = security.rate_limit_burst_size {
                self.rate_limit_burst_size = burst;
            }
            if let Some(max) = security.max_websocket_connections {
                self.max_websocket_connections = Some(max);
            }
            if let Some(max) = security.max_connections_per_ip {
                self.max_connections_per_ip = max;
            }
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.port == 0 {
            return Err("server port must be non-zero".into());
        }
        if self.reply_language.is_empty() {
            return Err("reply_language must not be empty".into());
        }
        if self.persona.trim().is_empty() {
            return Err("persona must not be empty".into());
        }
        if self.artifact_ttl_seconds == 0 {
            return Err("artifacts.ttl_seconds must be non-zero".into());
        }
        if let Some(rate) = self.tts_speaking_rate
            && !(0.25..=4.0).contains(&rate)
        {
            return Err(format!("tts speaking_rate {rate} outside supported range 0.25-4.0").into());
        }
        if let Some(ref tls) = self.tls {
            if !tls.cert_path.exists() {
                return Err(format!(
                    "TLS certificate file not found: {}",
                    tls.cert_path.display()
                )
                .into());
            }
            if !tls.key_path.exists() {
                return Err(format!("TLS key file not found: {}", tls.key_path.display()).into());
            }
        }
        Ok(())
    }
}

/// Human-readable name for an ISO 639-1 language code, used in the seed
/// prompt's output-language constraint. Unknown codes pass through as-is.
fn language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "hi" => "Hindi",
        "it" => "Italian",
        "ja" => "Japanese",
        "pt" => "Portuguese",
        "zh" => "Mandarin Chinese",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "0.0.0.0:5000");
        assert!(!config.is_tls_enabled());
        assert_eq!(config.stt_model, "whisper-1");
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.tts_voice, "shimmer");
        assert_eq!(config.reply_language, "en");
        assert_eq!(config.artifact_ttl_seconds, 900);
    }

    #[test]
    fn test_seed_prompt_contains_language_constraint() {
        let config = ServerConfig::default();
        let prompt = config.seed_prompt();
        assert!(prompt.contains("respond only in English"));
        assert!(prompt.starts_with(DEFAULT_PERSONA));
    }

    #[test]
    fn test_seed_prompt_custom_language() {
        let mut config = ServerConfig::default();
        config.reply_language = "es".to_string();
        assert!(config.seed_prompt().contains("Spanish"));
    }

    #[test]
    fn test_yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 6000
providers:
  openai_api_key: "sk-test"
pipeline:
  reply_language: "fr"
  chat:
    model: "gpt-4o"
    temperature: 0.5
  tts:
    voice: "nova"
artifacts:
  ttl_seconds: 60
"#
        )
        .unwrap();

        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6000);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.reply_language, "fr");
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.chat_temperature, Some(0.5));
        assert_eq!(config.tts_voice, "nova");
        assert_eq!(config.artifact_ttl_seconds, 60);
        // Untouched values keep their defaults
        assert_eq!(config.stt_model, "whisper-1");
    }

    #[test]
    fn test_invalid_speaking_rate_rejected() {
        let mut config = ServerConfig::default();
        config.tts_speaking_rate = Some(9.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = ServerConfig::default();
        config.artifact_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }
}

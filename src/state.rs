//! Shared application state.
//!
//! `AppState` carries the loaded configuration, the three pipeline provider
//! handles, the reply artifact store, and WebSocket connection accounting.
//! Providers are stateless HTTP clients and are shared across sessions;
//! everything conversational (history, pipeline state) lives in the
//! per-connection session, never here.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use crate::config::ServerConfig;
use crate::core::artifacts::ArtifactStore;
use crate::core::chat::{BaseChat, ChatConfig, create_chat_provider};
use crate::core::stt::{AudioInputFormat, BaseSTT, STTConfig, create_stt_provider};
use crate::core::tts::{AudioOutputFormat, BaseTTS, TTSConfig, create_tts_provider};

/// The three external-service handles a session pipeline needs.
#[derive(Clone)]
pub struct PipelineServices {
    pub stt: Arc<dyn BaseSTT>,
    pub chat: Arc<dyn BaseChat>,
    pub tts: Arc<dyn BaseTTS>,
}

/// Why a connection was refused by the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLimitError {
    /// The global WebSocket connection limit has been reached
    GlobalLimitReached,
    /// The per-IP connection limit has been reached
    PerIpLimitReached,
}

/// Application state shared across all handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub services: PipelineServices,
    pub artifacts: ArtifactStore,

    /// Total active WebSocket connections
    ws_connections: AtomicUsize,
    /// Active WebSocket connections per client IP
    ip_connections: DashMap<IpAddr, usize>,
}

impl AppState {
    /// Build application state from configuration, constructing the
    /// provider clients via their factories.
    pub fn new(config: ServerConfig) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or("OPENAI_API_KEY is required to start the gateway")?;

        let stt = create_stt_provider(
            &config.stt_provider,
            STTConfig {
                api_key: api_key.clone(),
                model: config.stt_model.clone(),
                language: config.reply_language.clone(),
                audio_format: AudioInputFormat::from_str_or_default(&config.stt_audio_format),
                api_url: config.stt_api_url.clone(),
            },
        )?;

        let chat = create_chat_provider(
            &config.chat_provider,
            ChatConfig {
                api_key: api_key.clone(),
                model: config.chat_model.clone(),
                temperature: config.chat_temperature,
                api_url: config.chat_api_url.clone(),
            },
        )?;

        let tts = create_tts_provider(
            &config.tts_provider,
            TTSConfig {
                api_key,
                model: config.tts_model.clone(),
                voice_id: Some(config.tts_voice.clone()),
                audio_format: AudioOutputFormat::from_str_or_default(&config.tts_audio_format),
                speaking_rate: config.tts_speaking_rate,
                api_url: config.tts_api_url.clone(),
            },
        )?;

        Ok(Self::with_services(config, PipelineServices { stt, chat, tts }))
    }

    /// Build application state with explicit provider handles. Used by
    /// tests to inject in-process mock providers.
    pub fn with_services(config: ServerConfig, services: PipelineServices) -> Arc<Self> {
        let artifacts = ArtifactStore::new(
            Duration::from_secs(config.artifact_ttl_seconds),
            config.artifact_max_bytes,
        );
        Arc::new(Self {
            config,
            services,
            artifacts,
            ws_connections: AtomicUsize::new(0),
            ip_connections: DashMap::new(),
        })
    }

    /// Try to reserve a connection slot for the given client IP.
    pub fn try_acquire_connection(&self, ip: IpAddr) -> Result<(), ConnectionLimitError> {
        if let Some(max) = self.config.max_websocket_connections
            && self.ws_connections.load(Ordering::Acquire) >= max
        {
            return Err(ConnectionLimitError::GlobalLimitReached);
        }

        let max_per_ip = self.config.max_connections_per_ip as usize;
        let mut entry = self.ip_connections.entry(ip).or_insert(0);
        if *entry >= max_per_ip {
            return Err(ConnectionLimitError::PerIpLimitReached);
        }
        *entry += 1;
        drop(entry);

        self.ws_connections.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Release a previously acquired connection slot.
    pub fn release_connection(&self, ip: IpAddr) {
        self.ws_connections.fetch_sub(1, Ordering::AcqRel);
        if let Some(mut entry) = self.ip_connections.get_mut(&ip) {
            *entry = entry.saturating_sub(1);
            let now_zero = *entry == 0;
            drop(entry);
            if now_zero {
                self.ip_connections.remove_if(&ip, |_, count| *count == 0);
            }
        }
    }

    /// Total active WebSocket connections.
    pub fn ws_connection_count(&self) -> usize {
        self.ws_connections.load(Ordering::Acquire)
    }

    /// Active WebSocket connections for one client IP.
    pub fn ip_connection_count(&self, ip: &IpAddr) -> usize {
        self.ip_connections.get(ip).map(|entry| *entry).unwrap_or(0)
    }
}

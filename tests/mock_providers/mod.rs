//! In-process mock pipeline providers for end-to-end tests.
//!
//! These implement the provider traits directly (no network), so tests can
//! script each pipeline stage's behavior and observe what the orchestrator
//! sent it.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use tokio::net::TcpListener;

use solace_gateway::core::chat::{BaseChat, ChatError, ChatResult};
use solace_gateway::core::session::Turn;
use solace_gateway::core::stt::{BaseSTT, STTError, STTResult};
use solace_gateway::core::tts::{AudioOutputFormat, BaseTTS, TTSError, TTSResult};
use solace_gateway::middleware::connection_limit_middleware;
use solace_gateway::state::{AppState, PipelineServices};
use solace_gateway::{ServerConfig, routes};

/// Scripted transcription behavior.
#[derive(Clone)]
pub enum SttBehavior {
    /// Always return this transcript
    Fixed(String),
    /// Sleep, then return this transcript
    Slow(Duration, String),
    /// Always fail
    Fail(String),
}

pub struct MockSTT {
    pub behavior: SttBehavior,
    pub calls: Mutex<usize>,
}

impl MockSTT {
    pub fn fixed(transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: SttBehavior::Fixed(transcript.to_string()),
            calls: Mutex::new(0),
        })
    }

    pub fn slow(delay: Duration, transcript: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: SttBehavior::Slow(delay, transcript.to_string()),
            calls: Mutex::new(0),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior: SttBehavior::Fail(reason.to_string()),
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl BaseSTT for MockSTT {
    async fn transcribe(&self, _audio: Bytes) -> STTResult<String> {
        *self.calls.lock().unwrap() += 1;
        match &self.behavior {
            SttBehavior::Fixed(transcript) => Ok(transcript.clone()),
            SttBehavior::Slow(delay, transcript) => {
                tokio::time::sleep(*delay).await;
                Ok(transcript.clone())
            }
            SttBehavior::Fail(reason) => Err(STTError::ProviderError(reason.clone())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub struct MockChat {
    pub reply: Option<String>,
    /// Every prompt the orchestrator sent, for context assertions
    pub prompts: Mutex<Vec<Vec<Turn>>>,
}

impl MockChat {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl BaseChat for MockChat {
    async fn generate(&self, history: &[Turn]) -> ChatResult<String> {
        self.prompts.lock().unwrap().push(history.to_vec());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ChatError::ProviderError("generation down".to_string())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

pub struct MockTTS {
    pub audio: Option<Bytes>,
}

impl MockTTS {
    pub fn fixed(audio: &'static [u8]) -> Arc<Self> {
        Arc::new(Self {
            audio: Some(Bytes::from_static(audio)),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { audio: None })
    }
}

#[async_trait]
impl BaseTTS for MockTTS {
    async fn synthesize(&self, _text: &str) -> TTSResult<Bytes> {
        match &self.audio {
            Some(audio) => Ok(audio.clone()),
            None => Err(TTSError::ProviderError("synthesis down".to_string())),
        }
    }

    fn output_format(&self) -> AudioOutputFormat {
        AudioOutputFormat::Mp3
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Application state wired with the given mocks.
pub fn mock_state(
    stt: Arc<dyn BaseSTT>,
    chat: Arc<dyn BaseChat>,
    tts: Arc<dyn BaseTTS>,
) -> Arc<AppState> {
    let config = ServerConfig::default();
    AppState::with_services(config, PipelineServices { stt, chat, tts })
}

/// The full application router, as assembled in main.
pub fn app_router(state: Arc<AppState>) -> Router {
    let session_routes = routes::session::create_session_router().layer(
        axum::middleware::from_fn_with_state(state.clone(), connection_limit_middleware),
    );
    Router::new()
        .route(
            "/",
            axum::routing::get(solace_gateway::handlers::api::health_check),
        )
        .merge(routes::api::create_api_router())
        .merge(session_routes)
        .with_state(state)
}

/// Bind an ephemeral port and serve the app; returns the bound address.
pub async fn spawn_server(state: Arc<AppState>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

//! WebSocket driver for the client state machine.
//!
//! `SessionClient` runs one conversation against a live gateway: it records
//! utterances through an [`AudioCapture`], transmits them as binary frames,
//! waits for the reply message, fetches the reply artifact over HTTP and
//! plays it through an [`AudioPlayback`], feeding every observation through
//! the pure [`VoiceClient`] machine so the turn-taking rules live in exactly
//! one place.
//!
//! The protocol is strictly sequential, so the driver is a phase loop rather
//! than a free-running event pump: it listens, transmits, waits, plays, and
//! repeats until the capture source ends or a shutdown is requested.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::select;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::{ClientAction, ClientEvent, SessionPhase, VoiceClient};

/// Microphone-side collaborator: detects speech activity and yields one
/// finalized utterance buffer at a time.
#[async_trait]
pub trait AudioCapture: Send {
    /// Record until speech activity stops and return the finalized
    /// utterance buffer. `None` means the capture source is exhausted and
    /// the session should end.
    async fn next_utterance(&mut self) -> Option<Bytes>;

    /// Stop recording and release the capture hardware.
    fn stop(&mut self);
}

/// Speaker-side collaborator.
#[async_trait]
pub trait AudioPlayback: Send {
    /// Play one reply to completion.
    async fn play(&mut self, audio: Bytes);

    /// Immediately stop any in-progress playback.
    fn stop(&mut self);
}

/// Errors produced by the session client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to gateway: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Session client configuration.
#[derive(Debug, Clone)]
pub struct SessionClientConfig {
    /// WebSocket endpoint, e.g. `ws://localhost:5000/session`
    pub ws_url: String,
    /// HTTP base for artifact fetches, e.g. `http://localhost:5000`
    pub http_base_url: String,
    /// How long to wait for a reply before resolving back to listening
    pub reply_timeout: Duration,
}

impl SessionClientConfig {
    pub fn new(ws_url: impl Into<String>, http_base_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            http_base_url: http_base_url.into(),
            reply_timeout: Duration::from_secs(30),
        }
    }
}

/// Server-to-client messages, mirroring the gateway's outgoing shapes.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ServerMessage {
    #[serde(rename = "audio")]
    Audio {
        text: String,
        #[serde(rename = "audioUrl")]
        audio_url: String,
    },
    #[serde(rename = "error")]
    Error { error: String },
}

/// Drives one voice conversation over a WebSocket connection.
pub struct SessionClient<C, P> {
    config: SessionClientConfig,
    machine: VoiceClient,
    capture: C,
    playback: P,
    http: reqwest::Client,
}

impl<C: AudioCapture, P: AudioPlayback> SessionClient<C, P> {
    pub fn new(config: SessionClientConfig, capture: C, playback: P) -> Self {
        Self {
            config,
            machine: VoiceClient::new(),
            capture,
            playback,
            http: reqwest::Client::new(),
        }
    }

    /// Run the session until the capture source ends, the server closes the
    /// connection, or `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<(), ClientError> {
        let (socket, _) = connect_async(self.config.ws_url.as_str())
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        info!(url = %self.config.ws_url, "Voice session connected");
        self.machine.on_event(ClientEvent::SessionStarted);

        loop {
            match self.machine.phase() {
                SessionPhase::Listening => {
                    select! {
                        _ = shutdown.cancelled() => {
                            self.end_session(&mut sink).await;
                            break;
                        }
                        maybe_utterance = self.capture.next_utterance() => {
                            let Some(utterance) = maybe_utterance else {
                                debug!("Capture source exhausted, ending session");
                                self.end_session(&mut sink).await;
                                break;
                            };
                            let actions = self.machine.on_event(ClientEvent::UtteranceFinalized);
                            if actions.contains(&ClientAction::TransmitUtterance) {
                                debug!(bytes = utterance.len(), "Transmitting utterance");
                                sink.send(Message::Binary(utterance))
                                    .await
                                    .map_err(|e| ClientError::Transport(e.to_string()))?;
                            }
                        }
                        // The server only speaks mid-listening to report a
                        // connection-level problem (e.g. idle timeout).
                        incoming = stream.next() => {
                            match incoming {
                                Some(Ok(Message::Text(text))) => {
                                    debug!("Server message while listening: {}", text.as_str());
                                }
                                Some(Ok(Message::Close(_))) | None => {
                                    info!("Connection closed by server");
                                    self.machine.on_event(ClientEvent::SessionEnded);
                                    self.stop_devices();
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    self.machine.on_event(ClientEvent::SessionEnded);
                                    self.stop_devices();
                                    return Err(ClientError::Transport(e.to_string()));
                                }
                            }
                        }
                    }
                }

                SessionPhase::Processing => {
                    select! {
                        _ = shutdown.cancelled() => {
                            self.end_session(&mut sink).await;
                            break;
                        }
                        outcome = tokio::time::timeout(self.config.reply_timeout, stream.next()) => {
                            match outcome {
                                Err(_) => {
                                    warn!("No reply within {:?}, resuming listening", self.config.reply_timeout);
                                    self.machine.on_event(ClientEvent::ReplyTimeout);
                                }
                                Ok(Some(Ok(Message::Text(text)))) => {
                                    self.handle_server_message(text.as_str(), &shutdown, &mut sink).await?;
                                }
                                Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                                    info!("Connection closed by server");
                                    self.machine.on_event(ClientEvent::SessionEnded);
                                    self.stop_devices();
                                    break;
                                }
                                Ok(Some(Ok(_))) => {}
                                Ok(Some(Err(e))) => {
                                    self.machine.on_event(ClientEvent::SessionEnded);
                                    self.stop_devices();
                                    return Err(ClientError::Transport(e.to_string()));
                                }
                            }
                        }
                    }
                }

                // Speaking is handled inline by handle_server_message, and
                // Idle means the session is over.
                SessionPhase::Speaking | SessionPhase::Idle => break,
            }
        }

        info!("Voice session finished");
        Ok(())
    }

    /// React to one server text message received while waiting for a reply.
    async fn handle_server_message<S>(
        &mut self,
        text: &str,
        shutdown: &CancellationToken,
        sink: &mut S,
    ) -> Result<(), ClientError>
    where
        S: Sink<Message> + Unpin,
        S::Error: std::fmt::Display,
    {
        let message: ServerMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                warn!("Unparseable server message: {e}");
                return Ok(());
            }
        };

        match message {
            ServerMessage::Audio { text, audio_url } => {
                debug!(reply = %text, "Reply received");

                // Fetch the artifact before transitioning; a failed fetch
                // resolves the turn like a server-side error would.
                let url = format!("{}{}", self.config.http_base_url, audio_url);
                let audio = match self.fetch_artifact(&url).await {
                    Ok(audio) => audio,
                    Err(e) => {
                        warn!("Failed to fetch reply artifact: {e}");
                        self.machine.on_event(ClientEvent::ErrorArrived);
                        return Ok(());
                    }
                };

                let actions = self.machine.on_event(ClientEvent::ReplyArrived);
                if actions.contains(&ClientAction::BeginPlayback) {
                    select! {
                        _ = shutdown.cancelled() => {
                            // Stop playback immediately, not after natural
                            // completion
                            self.end_session(sink).await;
                        }
                        _ = self.playback.play(audio) => {
                            self.machine.on_event(ClientEvent::PlaybackFinished);
                        }
                    }
                }
            }
            ServerMessage::Error { error } => {
                warn!(error = %error, "Turn failed server-side");
                self.machine.on_event(ClientEvent::ErrorArrived);
            }
        }

        Ok(())
    }

    async fn fetch_artifact(&self, url: &str) -> Result<Bytes, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("artifact fetch returned {}", response.status()));
        }
        response.bytes().await.map_err(|e| e.to_string())
    }

    /// End the session locally: flip the machine inactive first so any reply
    /// still in flight is dropped by the transition rules, then stop the
    /// hardware and tell the server.
    async fn end_session<S>(&mut self, sink: &mut S)
    where
        S: Sink<Message> + Unpin,
        S::Error: std::fmt::Display,
    {
        for action in self.machine.on_event(ClientEvent::SessionEnded) {
            match action {
                ClientAction::StopCapture | ClientAction::ReleaseCapture => self.capture.stop(),
                ClientAction::StopPlayback => self.playback.stop(),
                _ => {}
            }
        }

        let end_signal = serde_json::json!({ "type": "end_session" }).to_string();
        if let Err(e) = sink.send(Message::Text(end_signal.into())).await {
            debug!("Could not send end-of-session signal: {e}");
        }
        let _ = sink.send(Message::Close(None)).await;
    }

    fn stop_devices(&mut self) {
        self.capture.stop();
        self.playback.stop();
    }
}

//! Voice session WebSocket handler.
//!
//! One connection is one conversation. The handler owns the connection's
//! `SessionOrchestrator` behind an async mutex; each binary frame is one
//! complete utterance, processed by a spawned pipeline task that holds the
//! session lock for the whole turn. The read loop never awaits the pipeline,
//! so an end-of-session signal or socket close is always observed promptly:
//! closing cancels the in-flight turn via a cancellation token, and nothing
//! is written to a closed channel.
//!
//! An utterance that arrives while a turn is in flight fails the lock
//! acquisition and is dropped with a logged anomaly. The client state
//! machine does not record while a reply is pending, so such a frame means a
//! stale or misbehaving peer, not a fatal condition.

use axum::{
    Extension,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::{select, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::session::{SessionOrchestrator, TurnOutcome};
use crate::middleware::ClientIp;
use crate::state::AppState;

use super::messages::{ControlMessage, MessageRoute, OutgoingMessage};

/// Outbound message channel depth
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// Voice session WebSocket handler
///
/// Upgrades the HTTP connection to WebSocket and runs one conversation
/// session for its lifetime.
pub async fn session_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    client_ip: Option<Extension<ClientIp>>,
) -> Response {
    info!(peer = %addr, "Voice session connection upgrade requested");

    let client_ip = client_ip.map(|Extension(ClientIp(ip))| ip);
    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_session_socket(socket, state, client_ip))
}

/// Handle one voice session connection.
async fn handle_session_socket(
    socket: WebSocket,
    app_state: Arc<AppState>,
    client_ip: Option<std::net::IpAddr>,
) {
    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<MessageRoute>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing messages
    let sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            let should_close = matches!(route, MessageRoute::Close);

            let result = match route {
                MessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json_str) => sender.send(Message::Text(json_str.into())).await,
                    Err(e) => {
                        warn!("Failed to serialize outgoing message: {}", e);
                        continue;
                    }
                },
                MessageRoute::Close => {
                    info!("Closing voice session connection");
                    sender.send(Message::Close(None)).await
                }
            };

            if let Err(e) = result {
                warn!("Failed to send WebSocket message: {}", e);
                break;
            }

            if should_close {
                break;
            }
        }
    });

    // One orchestrator per connection. The async mutex is the turn guard:
    // the pipeline task holds it across all three external calls, and a
    // frame that fails try_lock is a protocol violation.
    let services = app_state.services.clone();
    let orchestrator = SessionOrchestrator::new(
        app_state.config.seed_prompt(),
        services.stt,
        services.chat,
        services.tts,
        app_state.artifacts.clone(),
    );
    let session_id = orchestrator.id();
    let session = Arc::new(Mutex::new(orchestrator));
    let cancel = CancellationToken::new();

    // How often we check if the connection is stale
    let idle_check_interval = Duration::from_secs(30);

    // Maximum idle time before closing the connection (5 minutes with ±10%
    // jitter so simultaneous timeouts don't stampede)
    let base_idle_secs: u64 = 300;
    let jitter_range: u64 = 30;
    let jitter_offset =
        (std::time::Instant::now().elapsed().as_nanos() as u64 % (jitter_range * 2)) as i64
            - jitter_range as i64;
    let idle_secs = (base_idle_secs as i64 + jitter_offset).max(1) as u64;
    let idle_timeout = Duration::from_secs(idle_secs);

    let mut last_activity = std::time::Instant::now();

    loop {
        select! {
            msg_result = receiver.next() => {
                last_activity = std::time::Instant::now();

                match msg_result {
                    Some(Ok(msg)) => {
                        let continue_processing = process_session_message(
                            msg,
                            &session,
                            &cancel,
                            &message_tx,
                        )
                        .await;

                        if !continue_processing {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(session_id = %session_id, "Voice session WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(session_id = %session_id, "Voice session connection closed by client");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(idle_check_interval) => {
                if last_activity.elapsed() > idle_timeout {
                    warn!(
                        session_id = %session_id,
                        "Voice session idle for {}s, closing stale connection",
                        last_activity.elapsed().as_secs()
                    );
                    let _ = message_tx
                        .send(MessageRoute::Outgoing(OutgoingMessage::Error {
                            error: "Connection closed due to inactivity".to_string(),
                        }))
                        .await;
                    let _ = message_tx.send(MessageRoute::Close).await;
                    break;
                }
                debug!(session_id = %session_id, "Voice session idle check - still active");
            }
        }
    }

    // Abandon any in-flight pipeline work, then close the session so a late
    // frame or response cannot resurrect its state.
    cancel.cancel();
    session.lock().await.close();
    sender_task.abort();

    if let Some(ip) = client_ip {
        app_state.release_connection(ip);
    }

    info!(session_id = %session_id, "Voice session terminated");
}

/// Process one incoming WebSocket message.
///
/// Returns `false` to terminate the connection.
async fn process_session_message(
    msg: Message,
    session: &Arc<Mutex<SessionOrchestrator>>,
    cancel: &CancellationToken,
    message_tx: &mpsc::Sender<MessageRoute>,
) -> bool {
    match msg {
        Message::Binary(data) => {
            if data.is_empty() {
                debug!("Ignoring empty utterance frame");
                return true;
            }
            debug!(bytes = data.len(), "Received utterance frame");
            dispatch_utterance(data, session, cancel, message_tx);
            true
        }
        Message::Text(text) => match serde_json::from_str::<ControlMessage>(text.as_str()) {
            Ok(ControlMessage::EndSession) => {
                info!("End-of-session signal received");
                false
            }
            Err(e) => {
                warn!("Unparseable control message: {}", e);
                let _ = message_tx
                    .send(MessageRoute::Outgoing(OutgoingMessage::Error {
                        error: format!("Invalid message format: {e}"),
                    }))
                    .await;
                true
            }
        },
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            info!("Voice session close frame received");
            false
        }
    }
}

/// Start the pipeline for one utterance without blocking the read loop.
///
/// The session lock is acquired here, synchronously, so two frames racing
/// each other cannot both be accepted; the guard travels into the spawned
/// task and is held until the turn finishes or is cancelled.
fn dispatch_utterance(
    data: bytes::Bytes,
    session: &Arc<Mutex<SessionOrchestrator>>,
    cancel: &CancellationToken,
    message_tx: &mpsc::Sender<MessageRoute>,
) {
    let Ok(mut guard) = session.clone().try_lock_owned() else {
        warn!("Utterance received while a turn is in flight, dropping (protocol violation)");
        return;
    };

    let tx = message_tx.clone();
    let cancel = cancel.child_token();
    tokio::spawn(async move {
        select! {
            _ = cancel.cancelled() => {
                debug!(session_id = %guard.id(), "In-flight turn abandoned: session closing");
            }
            result = guard.process_utterance(data) => {
                match result {
                    Ok(TurnOutcome::Reply { text, audio_url }) => {
                        let _ = tx
                            .send(MessageRoute::Outgoing(OutgoingMessage::Audio {
                                text,
                                audio_url,
                            }))
                            .await;
                    }
                    Ok(TurnOutcome::Discarded) => {
                        debug!(session_id = %guard.id(), "Turn discarded (empty transcription)");
                    }
                    Err(err) if err.is_reportable() => {
                        warn!(session_id = %guard.id(), "Turn failed: {}", err);
                        let _ = tx
                            .send(MessageRoute::Outgoing(OutgoingMessage::Error {
                                error: err.to_string(),
                            }))
                            .await;
                    }
                    Err(err) => {
                        // Guard violations are dropped, not surfaced
                        warn!(session_id = %guard.id(), "Turn rejected: {}", err);
                    }
                }
            }
        }
    });
}

//! Voice session WebSocket message types.
//!
//! The client-to-server direction is mostly binary: each binary frame
//! carries one complete utterance. The only text message a client sends is
//! the `end_session` control signal. Server-to-client messages are JSON
//! tagged with `type`.

use serde::{Deserialize, Serialize};

/// Control messages from the client (text frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Explicit end-of-session signal; equivalent to closing the socket.
    EndSession,
}

/// Outgoing WebSocket messages to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    /// A completed turn: reply text plus the locator to fetch its audio.
    #[serde(rename = "audio")]
    Audio {
        /// Assistant reply text
        text: String,
        /// Fetch path for the synthesized audio
        #[serde(rename = "audioUrl")]
        audio_url: String,
    },

    /// A failed turn. The session remains open; the client should resume
    /// listening.
    #[serde(rename = "error")]
    Error {
        /// Human-readable failure description
        error: String,
    },
}

/// Internal routing envelope for the socket sender task.
#[derive(Debug)]
pub enum MessageRoute {
    /// Serialize and send a JSON message
    Outgoing(OutgoingMessage),
    /// Close the connection
    Close,
}

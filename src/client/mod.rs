//! Capture/playback client for the voice session protocol.
//!
//! The client half of the gateway: [`VoiceClient`] is the pure turn-taking
//! state machine (no I/O, fully testable), and [`SessionClient`] drives it
//! against a live WebSocket connection with microphone and speaker access
//! behind the [`AudioCapture`] and [`AudioPlayback`] traits.

mod driver;
mod state;

pub use driver::{
    AudioCapture, AudioPlayback, ClientError, SessionClient, SessionClientConfig,
};
pub use state::{ClientAction, ClientEvent, Indicator, SessionPhase, VoiceClient};

//! Voice session WebSocket transport.

mod handler;
mod messages;

pub use handler::session_handler;
pub use messages::{ControlMessage, MessageRoute, OutgoingMessage};

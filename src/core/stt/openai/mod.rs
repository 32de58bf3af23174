//! OpenAI Whisper STT provider.

mod client;
mod config;
mod messages;

pub use client::{OPENAI_STT_URL, OpenAISTT};
pub use config::OpenAISTTModel;
pub use messages::{OpenAIErrorResponse, TranscriptionResponse};

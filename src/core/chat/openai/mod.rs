//! OpenAI chat completions provider.

mod client;

pub use client::{OPENAI_CHAT_URL, OpenAIChat};

pub mod artifacts;
pub mod chat;
pub mod session;
pub mod stt;
pub mod tts;

// Re-export commonly used types for convenience
pub use artifacts::{ArtifactStore, ReplyArtifact};

pub use chat::{BaseChat, ChatConfig, ChatError, ChatResult, OpenAIChat, create_chat_provider};

pub use session::{
    ConversationHistory, Role, SessionOrchestrator, SessionState, Turn, TurnError, TurnOutcome,
};

pub use stt::{
    AudioInputFormat, BaseSTT, OpenAISTT, STTConfig, STTError, STTResult, create_stt_provider,
};

pub use tts::{
    AudioOutputFormat, BaseTTS, OpenAITTS, OpenAIVoice, TTSConfig, TTSError, TTSResult,
    create_tts_provider,
};

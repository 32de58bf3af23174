//! Session orchestrator: the turn-taking state machine.
//!
//! One orchestrator exists per connection and owns that conversation's
//! history and pipeline state. Each accepted utterance runs the three-stage
//! pipeline (transcribe, generate, synthesize) to completion or failure
//! while the session state guard excludes any second utterance. The state is
//! `Idle` exactly when no turn is in flight; callers that hold the session
//! behind an async mutex get the same guarantee structurally, since the lock
//! is held across all three suspension points.
//!
//! History commit rules:
//! - The user turn and its assistant reply are committed together, only
//!   after reply generation succeeds. A transcription or generation failure
//!   therefore leaves the transcript exactly as it was before the
//!   utterance.
//! - The assistant turn is committed strictly before synthesis begins. A
//!   synthesis failure keeps both turns: the text exists and remains part
//!   of the conversational context for following turns.

use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::artifacts::ArtifactStore;
use crate::core::chat::{BaseChat, ChatError};
use crate::core::session::{ConversationHistory, Turn};
use crate::core::stt::{BaseSTT, STTError};
use crate::core::tts::{BaseTTS, TTSError};
use std::sync::Arc;

/// Pipeline state of a session. Exactly one state is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept the next utterance
    Idle,
    /// Transcription call in flight
    Transcribing,
    /// Reply generation call in flight
    Generating,
    /// Speech synthesis call in flight
    Synthesizing,
    /// Session ended; no further utterances are accepted
    Closed,
}

/// Result of one accepted utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The pipeline completed; emit a reply message to the client.
    Reply {
        /// Assistant reply text
        text: String,
        /// Fetch path for the synthesized audio
        audio_url: String,
    },
    /// The utterance transcribed to nothing; the turn is dropped silently
    /// and no message is emitted.
    Discarded,
}

/// Failure of one accepted utterance.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// An utterance arrived while a turn was already in flight. Protocol
    /// violation: dropped and logged, never fatal.
    #[error("a turn is already in flight")]
    TurnInFlight,

    /// An utterance arrived after the session was closed.
    #[error("session is closed")]
    SessionClosed,

    /// The transcription service failed.
    #[error(transparent)]
    Transcription(#[from] STTError),

    /// The reply generation service failed.
    #[error(transparent)]
    Generation(#[from] ChatError),

    /// The speech synthesis service failed.
    #[error(transparent)]
    Synthesis(#[from] TTSError),
}

impl TurnError {
    /// Whether this failure should surface to the client as an error
    /// message. Guard violations are dropped instead, per the turn-taking
    /// protocol.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, TurnError::TurnInFlight | TurnError::SessionClosed)
    }
}

/// Orchestrates one conversation's lifecycle: state guard, three-stage
/// pipeline, history ordering and reply artifact creation.
pub struct SessionOrchestrator {
    id: Uuid,
    started_at: OffsetDateTime,
    state: SessionState,
    history: ConversationHistory,
    stt: Arc<dyn BaseSTT>,
    chat: Arc<dyn BaseChat>,
    tts: Arc<dyn BaseTTS>,
    artifacts: ArtifactStore,
}

impl SessionOrchestrator {
    /// Create a session seeded with the given persona prompt.
    pub fn new(
        persona: impl Into<String>,
        stt: Arc<dyn BaseSTT>,
        chat: Arc<dyn BaseChat>,
        tts: Arc<dyn BaseTTS>,
        artifacts: ArtifactStore,
    ) -> Self {
        let id = Uuid::new_v4();
        let started_at = OffsetDateTime::now_utc();
        info!(session_id = %id, "Session created");
        Self {
            id,
            started_at,
            state: SessionState::Idle,
            history: ConversationHistory::seeded(persona),
            stt,
            chat,
            tts,
            artifacts,
        }
    }

    /// Session identifier for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Session start time for log correlation.
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    /// Current pipeline state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The conversation transcript in order.
    pub fn history(&self) -> &[Turn] {
        self.history.turns()
    }

    /// Run the pipeline for one utterance.
    ///
    /// Emits exactly one `Reply` or error per accepted utterance; a
    /// discarded (empty-transcript) utterance produces neither. On any
    /// outcome except `Closed` the session returns to `Idle`, ready for the
    /// next utterance.
    pub async fn process_utterance(&mut self, audio: Bytes) -> Result<TurnOutcome, TurnError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Closed => return Err(TurnError::SessionClosed),
            _ => return Err(TurnError::TurnInFlight),
        }

        let result = self.run_pipeline(audio).await;
        if self.state != SessionState::Closed {
            self.state = SessionState::Idle;
        }
        result
    }

    async fn run_pipeline(&mut self, audio: Bytes) -> Result<TurnOutcome, TurnError> {
        // Step 1: transcribe, forced into the configured target language.
        self.state = SessionState::Transcribing;
        let transcript = self.stt.transcribe(audio).await?;
        let user_text = transcript.trim();

        if user_text.is_empty() {
            debug!(session_id = %self.id, "Empty transcription, discarding turn");
            return Ok(TurnOutcome::Discarded);
        }
        debug!(session_id = %self.id, transcript = %user_text, "Utterance transcribed");

        // Step 2: generate the reply against the full transcript. The user
        // turn is committed together with the reply, so a failed generation
        // leaves history untouched.
        self.state = SessionState::Generating;
        let prompt = self.history.with_pending_user_turn(user_text);
        let reply_text = self.chat.generate(&prompt).await?;
        self.history.push_exchange(user_text, reply_text.clone());
        debug!(session_id = %self.id, reply = %reply_text, "Reply generated");

        // Step 3: synthesize. The assistant turn is already in history, so
        // a crash or failure here leaves a consistent transcript (text
        // exists, audio does not).
        self.state = SessionState::Synthesizing;
        let audio = self.tts.synthesize(&reply_text).await?;
        let locator = self
            .artifacts
            .store(audio, self.tts.output_format().content_type())
            .await;

        info!(
            session_id = %self.id,
            locator = %locator,
            turns = self.history.completed_turns(),
            "Turn completed"
        );

        Ok(TurnOutcome::Reply {
            text: reply_text,
            audio_url: format!("/audio/{locator}"),
        })
    }

    /// Close the session. In-flight work is abandoned by the caller
    /// (dropping the pipeline future); any utterance that arrives afterwards
    /// is rejected.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            info!(
                session_id = %self.id,
                turns = self.history.completed_turns(),
                "Session closed"
            );
            self.state = SessionState::Closed;
        } else {
            warn!(session_id = %self.id, "Session close requested twice");
        }
    }
}

//! Client-side turn-taking state machine.
//!
//! Pure state: events in, actions out, no I/O. The driver (or a UI shell)
//! owns the hardware and the socket and feeds events here; every rule that
//! keeps the conversation in lock-step lives in this machine:
//!
//! - A reply arriving after the session ended locally is silently discarded
//!   and produces no playback and no transition. This is the cancellation
//!   contract that keeps stale audio out of a closed session.
//! - An error or reply timeout always resolves the waiting state, so the
//!   user is never stuck in `Processing`.
//! - Ending the session stops capture and playback immediately and releases
//!   the capture hardware, from any state.

/// Client conversation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session
    Idle,
    /// Recording, waiting for speech activity to stop
    Listening,
    /// Utterance transmitted, awaiting the reply
    Processing,
    /// Playing the reply
    Speaking,
}

/// UI indicator state. A pure projection of the machine for rendering;
/// carries no logic of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Idle,
    Listening,
    Processing,
    Speaking,
}

/// Events fed into the machine by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The user started a session; capture hardware is available.
    SessionStarted,
    /// Speech activity stopped and the utterance buffer was finalized.
    UtteranceFinalized,
    /// A reply message arrived from the server.
    ReplyArrived,
    /// An error message arrived from the server.
    ErrorArrived,
    /// No reply arrived within the waiting window.
    ReplyTimeout,
    /// Reply playback ran to completion.
    PlaybackFinished,
    /// The user ended the session.
    SessionEnded,
}

/// Actions the driver must perform in response to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Begin (or resume) recording the next utterance
    StartCapture,
    /// Transmit the finalized utterance buffer
    TransmitUtterance,
    /// Play the reply audio that just arrived
    BeginPlayback,
    /// Stop recording immediately
    StopCapture,
    /// Stop playback immediately, not after natural completion
    StopPlayback,
    /// Release the capture hardware
    ReleaseCapture,
}

/// The client turn-taking state machine.
#[derive(Debug)]
pub struct VoiceClient {
    phase: SessionPhase,
    session_active: bool,
}

impl VoiceClient {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            session_active: false,
        }
    }

    /// Current conversation phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a session is active.
    pub fn is_active(&self) -> bool {
        self.session_active
    }

    /// Derived UI indicator state.
    pub fn indicator(&self) -> Indicator {
        match self.phase {
            SessionPhase::Idle => Indicator::Idle,
            SessionPhase::Listening => Indicator::Listening,
            SessionPhase::Processing => Indicator::Processing,
            SessionPhase::Speaking => Indicator::Speaking,
        }
    }

    /// Apply one event, returning the actions the driver must perform, in
    /// order.
    pub fn on_event(&mut self, event: ClientEvent) -> Vec<ClientAction> {
        match event {
            ClientEvent::SessionStarted => {
                if self.session_active {
                    return Vec::new();
                }
                self.session_active = true;
                self.phase = SessionPhase::Listening;
                vec![ClientAction::StartCapture]
            }

            ClientEvent::UtteranceFinalized => {
                if !self.session_active || self.phase != SessionPhase::Listening {
                    return Vec::new();
                }
                self.phase = SessionPhase::Processing;
                vec![ClientAction::TransmitUtterance]
            }

            ClientEvent::ReplyArrived => {
                // A reply after local session end is dropped: no playback,
                // no transition.
                if !self.session_active || self.phase != SessionPhase::Processing {
                    return Vec::new();
                }
                self.phase = SessionPhase::Speaking;
                vec![ClientAction::BeginPlayback]
            }

            ClientEvent::ErrorArrived | ClientEvent::ReplyTimeout => {
                if !self.session_active || self.phase != SessionPhase::Processing {
                    return Vec::new();
                }
                // Non-fatal: resume listening so the user can try again
                self.phase = SessionPhase::Listening;
                vec![ClientAction::StartCapture]
            }

            ClientEvent::PlaybackFinished => {
                if self.phase != SessionPhase::Speaking {
                    return Vec::new();
                }
                if self.session_active {
                    self.phase = SessionPhase::Listening;
                    vec![ClientAction::StartCapture]
                } else {
                    self.phase = SessionPhase::Idle;
                    Vec::new()
                }
            }

            ClientEvent::SessionEnded => {
                if !self.session_active && self.phase == SessionPhase::Idle {
                    return Vec::new();
                }
                self.session_active = false;
                self.phase = SessionPhase::Idle;
                vec![
                    ClientAction::StopCapture,
                    ClientAction::StopPlayback,
                    ClientAction::ReleaseCapture,
                ]
            }
        }
    }
}

impl Default for VoiceClient {
    fn default() -> Self {
        Self::new()
    }
}

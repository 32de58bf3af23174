//! Conversation history types.
//!
//! A session's history is an append-only, role-tagged transcript seeded with
//! exactly one system turn. After the seed, turns strictly alternate
//! user/assistant; the only mutation path commits a completed user/assistant
//! exchange in one step, so a half-recorded turn can never be observed.

use serde::{Deserialize, Serialize};

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The seed persona/instructions turn
    System,
    /// A transcribed user utterance
    User,
    /// A generated agent reply
    Assistant,
}

impl Role {
    /// Convert to the wire value used by chat APIs.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One role-tagged message in a conversation.
///
/// For the user role the content is always the transcription output, never
/// raw audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation transcript, owned by exactly one session.
///
/// Insertion order is conversational order. After N completed turns the
/// transcript holds `1 + 2N` entries: the seed system turn followed by
/// alternating user/assistant pairs.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Create a history seeded with the given system persona. The seed is in
    /// place before any user turn can be processed.
    pub fn seeded(persona: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(persona)],
        }
    }

    /// All turns in conversational order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Total number of entries including the seed system turn.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed user/assistant exchanges.
    pub fn completed_turns(&self) -> usize {
        (self.turns.len() - 1) / 2
    }

    /// The transcript extended with a not-yet-committed user turn, used as
    /// the reply generation prompt. The pending turn only enters the
    /// transcript via [`push_exchange`](Self::push_exchange) once a reply
    /// exists for it.
    pub fn with_pending_user_turn(&self, content: &str) -> Vec<Turn> {
        let mut prompt = self.turns.clone();
        prompt.push(Turn::user(content));
        prompt
    }

    /// Commit a completed exchange: the user turn, then the assistant turn,
    /// in that order.
    pub fn push_exchange(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push(Turn::user(user));
        self.turns.push(Turn::assistant(assistant));
    }

    /// The most recent assistant turn, if any exchange has completed.
    pub fn last_assistant(&self) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_history_has_single_system_turn() {
        let history = ConversationHistory::seeded("You are a helpful agent.");
        assert_eq!(history.len(), 1);
        assert_eq!(history.completed_turns(), 0);
        assert_eq!(history.turns()[0].role, Role::System);
    }

    #[test]
    fn test_exchange_count_invariant() {
        let mut history = ConversationHistory::seeded("persona");
        for i in 0..5 {
            history.push_exchange(format!("user {i}"), format!("reply {i}"));
            assert_eq!(history.len(), 1 + 2 * (i + 1));
            assert_eq!(history.completed_turns(), i + 1);
        }
    }

    #[test]
    fn test_turns_alternate_after_seed() {
        let mut history = ConversationHistory::seeded("persona");
        history.push_exchange("hello", "hi there");
        history.push_exchange("how are you", "well, thanks");

        let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[test]
    fn test_pending_user_turn_is_not_committed() {
        let history = ConversationHistory::seeded("persona");
        let prompt = history.with_pending_user_turn("hello");
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[1], Turn::user("hello"));
        // The history itself is untouched
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_last_assistant() {
        let mut history = ConversationHistory::seeded("persona");
        assert!(history.last_assistant().is_none());
        history.push_exchange("a", "first");
        history.push_exchange("b", "second");
        assert_eq!(history.last_assistant().unwrap().content, "second");
    }

    #[test]
    fn test_role_wire_values() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
        assert_eq!(
            serde_json::to_string(&Turn::user("hi")).unwrap(),
            r#"{"role":"user","content":"hi"}"#
        );
    }
}

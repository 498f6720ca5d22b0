//! Conversation turns and the append-only history a session owns
//!
//! The provider API is stateless, so every request carries the whole history.
//! [`ConversationHistory`] exposes no way to remove, replace, or reorder turns.

use serde::{Deserialize, Serialize};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation
///
/// Fields are private: a turn is immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered, append-only sequence of turns owned by one session
///
/// Two concurrent calls must never share a history; callers serialize access
/// (the HTTP surface does so with a per-session lock).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    /// Create an empty history (the single-shot case)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn at the end
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// All turns in conversation order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// True when the most recent turn is a user turn with exactly this content
    ///
    /// Used to detect a submission the caller already appended before invoking
    /// the client, so it is neither appended nor sent twice.
    pub fn ends_with_user(&self, content: &str) -> bool {
        self.last()
            .is_some_and(|turn| turn.role == Role::User && turn.content == content)
    }
}

impl From<Vec<Turn>> for ConversationHistory {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl<'a> IntoIterator for &'a ConversationHistory {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

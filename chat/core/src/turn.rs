//! Conversation Turns
//!
//! A turn is one finalized message in the conversation log, attributed to a
//! role. Turns are immutable once created; the conversation log only ever
//! appends or drops whole turns.

use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the surface
    User,
    /// The question-answering backend
    Assistant,
    /// Instructions seeded into the conversation
    System,
}

impl Role {
    /// Lowercase wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized message in the conversation
///
/// Serializes to `{ "role": "...", "content": "..." }`, the shape the
/// question-answering endpoint expects in its `history` array.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    /// Create a turn with an explicit role
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Who authored this turn
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// The turn text
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether this turn was authored by the user
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Whether this turn was authored by the assistant
    #[must_use]
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

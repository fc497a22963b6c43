//! Surface Messages
//!
//! Messages sent from the exchange controller to the rendering surface. The
//! surface holds no business logic: it renders the turns, the streaming
//! buffer and the busy flag exactly as these messages describe them.
//!
//! Messages are emitted in the order the state changes happen, so replaying
//! them against an empty view reproduces the session.

use serde::{Deserialize, Serialize};

use crate::turn::Turn;

/// Messages from the exchange controller to a surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceMessage {
    /// A finalized turn was appended to the conversation
    TurnAppended {
        /// Position of the turn in the log
        index: usize,
        /// The appended turn
        turn: Turn,
    },

    /// The most recent turn was dropped (regenerate only)
    TurnRemoved {
        /// Position the turn occupied
        index: usize,
    },

    /// The busy flag changed
    Busy {
        /// Whether an exchange is in flight
        busy: bool,
    },

    /// The transient stream buffer changed
    ///
    /// Carries the running total, not the new fragment. An empty string means
    /// the buffer was cleared.
    StreamBuffer {
        /// Full buffer content
        content: String,
    },

    /// An exchange failed; the trailing user turn stays unanswered
    ExchangeFailed {
        /// Failure description
        error: String,
    },
}

impl SurfaceMessage {
    /// Whether this message clears the stream buffer
    #[must_use]
    pub fn is_buffer_cleared(&self) -> bool {
        matches!(self, Self::StreamBuffer { content } if content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_serialization() {
        let msg = SurfaceMessage::TurnAppended {
            index: 0,
            turn: Turn::user("Hello"),
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "turn_appended",
                "index": 0,
                "turn": { "role": "user", "content": "Hello" }
            })
        );

        let parsed: SurfaceMessage = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn test_buffer_cleared() {
        assert!(SurfaceMessage::StreamBuffer {
            content: String::new()
        }
        .is_buffer_cleared());
        assert!(!SurfaceMessage::StreamBuffer {
            content: "Hi".to_string()
        }
        .is_buffer_cleared());
        assert!(!SurfaceMessage::Busy { busy: false }.is_buffer_cleared());
    }
}

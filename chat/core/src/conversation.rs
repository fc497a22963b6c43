//! Conversation State
//!
//! The ordered log of finalized turns. From the point of view of `send` the
//! log is append-only; the single exception is dropping the most recent
//! turn, which only `regenerate` does.
//!
//! The log does not enforce strict user/assistant alternation. A failed
//! exchange leaves a trailing user turn with no answer, and the next `send`
//! simply appends after it.

use serde::{Deserialize, Serialize};

use crate::turn::Turn;

/// Ordered log of finalized turns
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with a system turn
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::system(prompt)],
        }
    }

    /// Append a turn and return its index
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// Drop the most recent turn
    pub(crate) fn remove_last(&mut self) -> Option<Turn> {
        self.turns.pop()
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Turn at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Turn> {
        self.turns.get(index)
    }

    /// Most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Index of the most recent assistant turn
    #[must_use]
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.turns.iter().rposition(Turn::is_assistant)
    }

    /// What a regenerate would replay
    ///
    /// Returns the history preceding the question together with the question
    /// itself, but only when the log ends in `[.., user, assistant]`.
    /// Anything else means there is no answer to discard or no question to
    /// re-ask.
    #[must_use]
    pub fn regenerate_target(&self) -> Option<(&[Turn], &Turn)> {
        let [history @ .., question, answer] = self.turns.as_slice() else {
            return None;
        };

        if answer.is_assistant() && question.is_user() {
            Some((history, question))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_and_read() {
        let mut conversation = ConversationState::new();
        assert!(conversation.is_empty());

        assert_eq!(conversation.push(Turn::user("Hello")), 0);
        assert_eq!(conversation.push(Turn::assistant("Hi")), 1);

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.get(0), Some(&Turn::user("Hello")));
        assert_eq!(conversation.last(), Some(&Turn::assistant("Hi")));
        assert_eq!(conversation.get(2), None);
    }

    #[test]
    fn test_remove_last_only_drops_tail() {
        let mut conversation = ConversationState::new();
        conversation.push(Turn::user("Q1"));
        conversation.push(Turn::assistant("A1"));

        assert_eq!(conversation.remove_last(), Some(Turn::assistant("A1")));
        assert_eq!(conversation.turns(), &[Turn::user("Q1")]);
    }

    #[test]
    fn test_regenerate_target_requires_user_then_assistant() {
        let mut conversation = ConversationState::new();
        assert!(conversation.regenerate_target().is_none());

        conversation.push(Turn::user("Q1"));
        assert!(conversation.regenerate_target().is_none());

        conversation.push(Turn::assistant("A1"));
        let (history, question) = conversation.regenerate_target().unwrap();
        assert!(history.is_empty());
        assert_eq!(question.content(), "Q1");

        conversation.push(Turn::user("Q2"));
        assert!(conversation.regenerate_target().is_none());
    }

    #[test]
    fn test_regenerate_target_keeps_earlier_history() {
        let mut conversation = ConversationState::with_system_prompt("be brief");
        conversation.push(Turn::user("Q1"));
        conversation.push(Turn::assistant("A1"));
        conversation.push(Turn::user("Q2"));
        conversation.push(Turn::assistant("A2"));

        let (history, question) = conversation.regenerate_target().unwrap();
        assert_eq!(
            history,
            &[
                Turn::system("be brief"),
                Turn::user("Q1"),
                Turn::assistant("A1"),
            ]
        );
        assert_eq!(question, &Turn::user("Q2"));
    }

    #[test]
    fn test_regenerate_target_rejects_lone_assistant() {
        let mut conversation = ConversationState::with_system_prompt("sys");
        conversation.push(Turn::assistant("greeting"));

        assert!(conversation.regenerate_target().is_none());
    }

    #[test]
    fn test_last_assistant_index() {
        let mut conversation = ConversationState::new();
        assert_eq!(conversation.last_assistant_index(), None);

        conversation.push(Turn::user("Q1"));
        conversation.push(Turn::assistant("A1"));
        conversation.push(Turn::user("Q2"));

        assert_eq!(conversation.last_assistant_index(), Some(1));
    }
}

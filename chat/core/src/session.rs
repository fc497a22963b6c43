//! Chat Session
//!
//! The explicit state object behind one chat: the conversation log, the
//! transient stream buffer and the busy flag. Surfaces read it through
//! [`ChatSession::snapshot`] and friends; only the exchange controller
//! mutates it.
//!
//! The lock is held for short synchronous sections only and never across an
//! await point, so readers always observe the state between two suspension
//! points of an exchange.

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use crate::accumulator::StreamAccumulator;
use crate::conversation::ConversationState;
use crate::turn::Turn;

/// Mutable session state, guarded by [`ChatSession`]
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) conversation: ConversationState,
    pub(crate) buffer: StreamAccumulator,
    pub(crate) busy: bool,
}

/// Point-in-time view of a session for rendering
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Finalized turns, oldest first
    pub turns: Vec<Turn>,
    /// In-progress reply, present only while non-empty
    pub streaming: Option<String>,
    /// Whether an exchange is in flight
    pub busy: bool,
}

/// Shared chat session state
#[derive(Debug, Default)]
pub struct ChatSession {
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Create an empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session whose log starts with a system turn
    pub fn with_system_prompt(prompt: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                conversation: ConversationState::with_system_prompt(prompt),
                ..SessionState::default()
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock()
    }

    /// Consistent view of turns, buffer and busy flag
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            turns: state.conversation.turns().to_vec(),
            streaming: (!state.buffer.is_empty()).then(|| state.buffer.as_str().to_string()),
            busy: state.busy,
        }
    }

    /// Finalized turns, oldest first
    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.state.lock().conversation.turns().to_vec()
    }

    /// Number of finalized turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().conversation.len()
    }

    /// Whether the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().conversation.is_empty()
    }

    /// Current stream buffer; empty when no exchange is in flight
    #[must_use]
    pub fn streaming_content(&self) -> String {
        self.state.lock().buffer.as_str().to_string()
    }

    /// Whether an exchange is in flight
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    /// Text of the turn at `index`
    #[must_use]
    pub fn turn_text(&self, index: usize) -> Option<String> {
        self.state
            .lock()
            .conversation
            .get(index)
            .map(|turn| turn.content().to_string())
    }

    /// Index of the most recent assistant turn
    #[must_use]
    pub fn last_assistant_index(&self) -> Option<usize> {
        self.state.lock().conversation.last_assistant_index()
    }
}

//! Exchange Controller
//!
//! Drives one request/response cycle at a time against a [`QaTransport`]:
//! record the question, stream the reply through the session's buffer, then
//! commit the answer and return to idle.
//!
//! # State transitions
//!
//! ```text
//! send("Hello")
//!   -> TurnAppended(user) -> Busy(true) -> StreamBuffer("")
//!   -> StreamBuffer("Hi") -> StreamBuffer("Hi there")      one per fragment
//!   -> TurnAppended(assistant) -> StreamBuffer("") -> Busy(false)
//! ```
//!
//! On failure the assistant turn is skipped, the buffer and busy flag are
//! restored, and `ExchangeFailed` follows. If the exchange future is dropped
//! before it finishes, the session is restored the same way.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ExchangeError;
use crate::messages::SurfaceMessage;
use crate::session::{ChatSession, SessionState};
use crate::transport::{ExchangeRequest, QaTransport, TransportReader};
use crate::turn::Turn;

type Updates = mpsc::UnboundedSender<SurfaceMessage>;

fn emit(updates: Option<&Updates>, msg: SurfaceMessage) {
    if let Some(tx) = updates {
        if tx.send(msg).is_err() {
            tracing::trace!("Surface receiver dropped");
        }
    }
}

/// Marks the session busy for the lifetime of one exchange
///
/// Dropping an unfinished guard puts the session back to idle.
struct BusyGuard<'a> {
    session: &'a ChatSession,
    updates: Option<&'a Updates>,
    armed: bool,
}

impl<'a> BusyGuard<'a> {
    fn begin(
        session: &'a ChatSession,
        state: &mut SessionState,
        updates: Option<&'a Updates>,
    ) -> Self {
        state.busy = true;
        emit(updates, SurfaceMessage::Busy { busy: true });
        state.buffer.reset();
        emit(
            updates,
            SurfaceMessage::StreamBuffer {
                content: String::new(),
            },
        );

        Self {
            session,
            updates,
            armed: true,
        }
    }

    /// Append the buffered reply as an assistant turn and go idle
    fn commit(mut self) -> Turn {
        self.armed = false;
        let mut state = self.session.lock();

        let turn = Turn::assistant(state.buffer.take());
        let index = state.conversation.push(turn.clone());
        emit(
            self.updates,
            SurfaceMessage::TurnAppended {
                index,
                turn: turn.clone(),
            },
        );

        Self::restore_idle(&mut state, self.updates);
        turn
    }

    /// Go idle without touching the log
    fn abort(mut self) {
        self.armed = false;
        Self::restore_idle(&mut self.session.lock(), self.updates);
    }

    fn restore_idle(state: &mut SessionState, updates: Option<&Updates>) {
        state.buffer.reset();
        emit(
            updates,
            SurfaceMessage::StreamBuffer {
                content: String::new(),
            },
        );
        state.busy = false;
        emit(updates, SurfaceMessage::Busy { busy: false });
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Exchange dropped before completion, restoring idle state");
            Self::restore_idle(&mut self.session.lock(), self.updates);
        }
    }
}

/// Runs exchanges for one [`ChatSession`]
///
/// At most one exchange is in flight per session. A second `send` or
/// `regenerate` while busy fails with [`ExchangeError::Busy`] without touching
/// the session.
pub struct ExchangeController<T: QaTransport + ?Sized> {
    transport: Arc<T>,
    session: Arc<ChatSession>,
    updates: Option<Updates>,
}

impl<T: QaTransport + ?Sized> ExchangeController<T> {
    /// Create a controller without a surface channel
    pub fn new(transport: Arc<T>, session: Arc<ChatSession>) -> Self {
        Self {
            transport,
            session,
            updates: None,
        }
    }

    /// Publish surface messages on `tx`
    #[must_use]
    pub fn with_updates(mut self, tx: mpsc::UnboundedSender<SurfaceMessage>) -> Self {
        self.updates = Some(tx);
        self
    }

    /// Open a fresh surface channel, replacing any previous one
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SurfaceMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.updates = Some(tx);
        rx
    }

    /// The session this controller mutates
    #[must_use]
    pub fn session(&self) -> &Arc<ChatSession> {
        &self.session
    }

    /// The transport requests go through
    #[must_use]
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Ask a new question
    ///
    /// The trimmed text is appended as a user turn before the request is
    /// issued and stays in the log even if the exchange fails. The request
    /// carries the history as it was before that turn.
    ///
    /// # Errors
    ///
    /// - [`ExchangeError::EmptyMessage`] for blank text, before any change
    /// - [`ExchangeError::Busy`] while another exchange is in flight
    /// - [`ExchangeError::TransportUnavailable`] or
    ///   [`ExchangeError::NetworkOrDecodeFailure`] from the transport
    pub async fn send(&self, text: &str) -> Result<Turn, ExchangeError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ExchangeError::EmptyMessage);
        }

        let (request, guard) = {
            let mut state = self.session.lock();
            if state.busy {
                return Err(ExchangeError::Busy);
            }

            let history = state.conversation.turns().to_vec();
            let turn = Turn::user(message);
            let index = state.conversation.push(turn.clone());
            self.emit(SurfaceMessage::TurnAppended { index, turn });

            let guard = BusyGuard::begin(&self.session, &mut state, self.updates.as_ref());
            (ExchangeRequest::new(history, message), guard)
        };

        let span = tracing::info_span!("exchange", exchange_id = %Uuid::new_v4(), kind = "send");
        self.run(request, guard).instrument(span).await
    }

    /// Discard the latest answer and ask its question again
    ///
    /// Only applies when the log ends in a user turn followed by an assistant
    /// turn; otherwise nothing changes and `Ok(None)` is returned. The user
    /// turn is not appended again.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), minus `EmptyMessage`. On failure the
    /// discarded answer is not restored.
    pub async fn regenerate(&self) -> Result<Option<Turn>, ExchangeError> {
        let (request, guard) = {
            let mut state = self.session.lock();
            if state.busy {
                return Err(ExchangeError::Busy);
            }

            let Some((history, question)) = state.conversation.regenerate_target() else {
                tracing::debug!(turns = state.conversation.len(), "Nothing to regenerate");
                return Ok(None);
            };
            let request = ExchangeRequest::new(history.to_vec(), question.content());

            let index = state.conversation.len() - 1;
            state.conversation.remove_last();
            self.emit(SurfaceMessage::TurnRemoved { index });

            let guard = BusyGuard::begin(&self.session, &mut state, self.updates.as_ref());
            (request, guard)
        };

        let span =
            tracing::info_span!("exchange", exchange_id = %Uuid::new_v4(), kind = "regenerate");
        self.run(request, guard).instrument(span).await.map(Some)
    }

    async fn run(
        &self,
        request: ExchangeRequest,
        guard: BusyGuard<'_>,
    ) -> Result<Turn, ExchangeError> {
        tracing::info!(
            transport = self.transport.name(),
            history_len = request.history.len(),
            message_len = request.message.len(),
            "Exchange started"
        );

        match self.stream_reply(&request).await {
            Ok(()) => {
                let turn = guard.commit();
                tracing::info!(reply_len = turn.content().len(), "Exchange complete");
                Ok(turn)
            }
            Err(error) => {
                guard.abort();
                tracing::error!(%error, "Exchange failed");
                self.emit(SurfaceMessage::ExchangeFailed {
                    error: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Feed every fragment of the reply into the session buffer
    async fn stream_reply(&self, request: &ExchangeRequest) -> Result<(), ExchangeError> {
        let body = self
            .transport
            .open(request)
            .await?
            .ok_or(ExchangeError::TransportUnavailable)?;

        let mut reader = TransportReader::new(body);
        while let Some(fragment) = reader.next_fragment().await {
            match fragment {
                Ok(text) => self.append_fragment(&text),
                Err(e) => {
                    reader.close();
                    return Err(e);
                }
            }
        }

        tracing::debug!(bytes_read = reader.bytes_read(), "Reply stream ended");
        Ok(())
    }

    fn append_fragment(&self, fragment: &str) {
        let mut state = self.session.lock();
        let content = state.buffer.push(fragment).to_string();
        tracing::debug!(
            fragment = state.buffer.fragment_count(),
            fragment_len = fragment.len(),
            total_len = content.len(),
            "Fragment received"
        );
        self.emit(SurfaceMessage::StreamBuffer { content });
    }

    fn emit(&self, msg: SurfaceMessage) {
        emit(self.updates.as_ref(), msg);
    }
}

//! Scripted Transport
//!
//! In-memory transport that replays queued replies in order and records every
//! request it receives. Used by the test suites and by embedders that need a
//! deterministic endpoint.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::traits::{ByteStream, ExchangeRequest, QaTransport};
use crate::error::ExchangeError;

/// One canned response
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    /// Body made of these chunks, then a clean end
    Body(Vec<Bytes>),
    /// Body that yields these chunks and then fails
    FailAfter {
        /// Chunks delivered before the failure
        chunks: Vec<Bytes>,
        /// Failure description
        error: String,
    },
    /// Body that yields these chunks and then stays open until released
    Held {
        /// Chunks delivered before waiting
        chunks: Vec<Bytes>,
        /// Notified to end the body
        release: Arc<Notify>,
    },
    /// Response with no readable body
    NoBody,
    /// Request never reaches the endpoint
    Refused(String),
}

/// Transport that replays [`ScriptedReply`]s
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<ExchangeRequest>>,
}

fn to_chunks<I, S>(fragments: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fragments
        .into_iter()
        .map(|f| Bytes::from(f.into()))
        .collect()
}

impl ScriptedTransport {
    /// Create a transport with no queued replies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply
    #[must_use]
    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Queue a body made of text fragments
    #[must_use]
    pub fn reply<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_reply(ScriptedReply::Body(to_chunks(fragments)))
    }

    /// Queue a body made of raw byte chunks
    #[must_use]
    pub fn reply_bytes(self, chunks: Vec<Vec<u8>>) -> Self {
        self.with_reply(ScriptedReply::Body(
            chunks.into_iter().map(Bytes::from).collect(),
        ))
    }

    /// Queue a body that fails after the given fragments
    #[must_use]
    pub fn fail_after<I, S>(self, fragments: I, error: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_reply(ScriptedReply::FailAfter {
            chunks: to_chunks(fragments),
            error: error.into(),
        })
    }

    /// Queue a body that stays open until `release` is notified
    #[must_use]
    pub fn held<I, S>(self, fragments: I, release: Arc<Notify>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_reply(ScriptedReply::Held {
            chunks: to_chunks(fragments),
            release,
        })
    }

    /// Queue a response without a body
    #[must_use]
    pub fn no_body(self) -> Self {
        self.with_reply(ScriptedReply::NoBody)
    }

    /// Queue a request that fails before any response
    #[must_use]
    pub fn refuse(self, error: impl Into<String>) -> Self {
        self.with_reply(ScriptedReply::Refused(error.into()))
    }

    /// Queue a reply on a shared transport
    pub fn push_reply(&self, reply: ScriptedReply) {
        self.replies.lock().push_back(reply);
    }

    /// Requests received so far, oldest first
    #[must_use]
    pub fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().clone()
    }

    /// Replies not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl QaTransport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn open(&self, request: &ExchangeRequest) -> Result<Option<ByteStream>, ExchangeError> {
        self.requests.lock().push(request.clone());

        let Some(reply) = self.replies.lock().pop_front() else {
            return Err(ExchangeError::NetworkOrDecodeFailure(
                "No scripted reply left".to_string(),
            ));
        };

        let body: ByteStream = match reply {
            ScriptedReply::Body(chunks) => stream::iter(chunks.into_iter().map(Ok)).boxed(),
            ScriptedReply::FailAfter { chunks, error } => stream::iter(chunks.into_iter().map(Ok))
                .chain(stream::once(async move {
                    Err(ExchangeError::NetworkOrDecodeFailure(error))
                }))
                .boxed(),
            ScriptedReply::Held { chunks, release } => stream::iter(chunks.into_iter().map(Ok))
                .chain(
                    stream::once(async move { release.notified().await })
                        .filter_map(|()| async { None }),
                )
                .boxed(),
            ScriptedReply::NoBody => return Ok(None),
            ScriptedReply::Refused(error) => {
                return Err(ExchangeError::NetworkOrDecodeFailure(error))
            }
        };

        Ok(Some(body))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

//! Transport Traits
//!
//! The seam between the exchange controller and whatever carries a request
//! to the question-answering endpoint. The controller only needs a byte body
//! back; framing, headers and connection handling belong to the transport.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::ExchangeError;
use crate::turn::Turn;

/// A streaming response body
pub type ByteStream = BoxStream<'static, Result<Bytes, ExchangeError>>;

/// Payload for one exchange
///
/// `history` never contains the pending message; it is sent separately in
/// `message`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExchangeRequest {
    /// Finalized turns preceding the message
    pub history: Vec<Turn>,
    /// The message being asked
    pub message: String,
}

impl ExchangeRequest {
    /// Create a request
    pub fn new(history: Vec<Turn>, message: impl Into<String>) -> Self {
        Self {
            history,
            message: message.into(),
        }
    }
}

/// Carries exchange requests to the endpoint
///
/// Implement this to point the controller at a different endpoint or to
/// replay canned responses in tests.
#[async_trait]
pub trait QaTransport: Send + Sync {
    /// Transport name for logs (e.g. "HTTP")
    fn name(&self) -> &str;

    /// Issue a request and return its body
    ///
    /// `Ok(None)` means the response arrived but carried no readable body.
    async fn open(&self, request: &ExchangeRequest) -> Result<Option<ByteStream>, ExchangeError>;

    /// Check whether the endpoint is reachable
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_wire_shape() {
        let request = ExchangeRequest::new(
            vec![Turn::user("Q1"), Turn::assistant("A1")],
            "Q2",
        );

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "history": [
                    { "role": "user", "content": "Q1" },
                    { "role": "assistant", "content": "A1" }
                ],
                "message": "Q2"
            })
        );
    }

    #[test]
    fn test_empty_history_serializes_as_array() {
        let request = ExchangeRequest::new(Vec::new(), "Hello");
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"history":[],"message":"Hello"}"#);
    }
}

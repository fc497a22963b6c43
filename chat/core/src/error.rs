//! Exchange Errors

use thiserror::Error;

/// Errors that end or prevent an exchange
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// The message was empty after trimming
    #[error("Message is empty")]
    EmptyMessage,

    /// Another exchange is already in flight
    #[error("An exchange is already in flight")]
    Busy,

    /// The response carried no readable body
    #[error("Response carried no readable body")]
    TransportUnavailable,

    /// Reading, decoding or reaching the endpoint failed
    #[error("Network or decode failure: {0}")]
    NetworkOrDecodeFailure(String),
}

impl ExchangeError {
    /// Whether this error came from the transport rather than a rejected call
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable | Self::NetworkOrDecodeFailure(_)
        )
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        Self::NetworkOrDecodeFailure(e.to_string())
    }
}

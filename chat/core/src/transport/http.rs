//! HTTP Transport
//!
//! Posts exchange requests to the question-answering endpoint and hands the
//! response body back as a byte stream.
//!
//! # Endpoint contract
//!
//! - `POST {endpoint}` with body `{ "history": [{role, content}, ...], "message": "..." }`
//! - `Accept: text/event-stream` so the server streams progressively
//! - The reply is raw text with no framing; every byte is reply content,
//!   whatever the status code
//!
//! No overall request timeout is set: a stalled stream stays open until the
//! server ends it. Only connecting is bounded.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::StatusCode;

use super::traits::{ByteStream, ExchangeRequest, QaTransport};
use crate::config::{ClientConfig, DEFAULT_ACCEPT, DEFAULT_ENDPOINT};
use crate::error::ExchangeError;

/// HTTP client for the question-answering endpoint
#[derive(Clone)]
pub struct HttpTransport {
    /// Full endpoint URL
    endpoint: String,
    /// Value for the Accept header
    accept: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for `endpoint` with a 5 second connect timeout
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_connect_timeout(endpoint, Duration::from_secs(5))
    }

    /// Create a transport with an explicit connect timeout
    pub fn with_connect_timeout(endpoint: impl Into<String>, connect_timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            endpoint: endpoint.into(),
            accept: DEFAULT_ACCEPT.to_string(),
            http_client,
        }
    }

    /// Create from loaded client configuration
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut transport = Self::with_connect_timeout(
            config.endpoint.clone(),
            Duration::from_millis(config.connect_timeout_ms),
        );
        transport.accept.clone_from(&config.accept);
        transport
    }

    /// The endpoint URL requests go to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl QaTransport for HttpTransport {
    fn name(&self) -> &'static str {
        "HTTP"
    }

    async fn open(&self, request: &ExchangeRequest) -> Result<Option<ByteStream>, ExchangeError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .header(ACCEPT, &self.accept)
            .header(CACHE_CONTROL, "no-cache")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        // These statuses never carry a body
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            tracing::warn!(%status, endpoint = %self.endpoint, "Response has no body");
            return Ok(None);
        }

        // error bodies are streamed like any other reply
        if !status.is_success() {
            tracing::warn!(%status, endpoint = %self.endpoint, "Endpoint returned an error status");
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(ExchangeError::from))
            .boxed();

        Ok(Some(stream))
    }

    async fn health_check(&self) -> bool {
        // Any HTTP answer (even 405) means the server is up
        self.http_client
            .get(&self.endpoint)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }
}

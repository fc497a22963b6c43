//! Transport Reader
//!
//! Wraps a response body and yields decoded text fragments in arrival order.
//! Fragments are safe at character boundaries but carry no other meaning:
//! they are not lines, tokens or events.

use futures::StreamExt;

use super::decoder::Utf8StreamDecoder;
use super::ByteStream;
use crate::error::ExchangeError;

/// Lazy, finite, non-restartable reader of text fragments
pub struct TransportReader {
    /// Underlying body; `None` once finished, failed or closed
    stream: Option<ByteStream>,
    decoder: Utf8StreamDecoder,
    bytes_read: u64,
}

impl TransportReader {
    /// Wrap a response body
    #[must_use]
    pub fn new(stream: ByteStream) -> Self {
        Self {
            stream: Some(stream),
            decoder: Utf8StreamDecoder::new(),
            bytes_read: 0,
        }
    }

    /// Read the next decoded fragment
    ///
    /// Returns `None` once the body has ended. After an error the reader is
    /// finished and the underlying body has been released.
    pub async fn next_fragment(&mut self) -> Option<Result<String, ExchangeError>> {
        loop {
            let stream = self.stream.as_mut()?;

            match stream.next().await {
                Some(Ok(bytes)) => {
                    self.bytes_read += bytes.len() as u64;
                    let text = self.decoder.decode(&bytes);
                    // chunk held only part of a character
                    if text.is_empty() {
                        continue;
                    }
                    return Some(Ok(text));
                }
                Some(Err(e)) => {
                    self.stream = None;
                    tracing::debug!(error = %e, bytes_read = self.bytes_read, "Response body failed");
                    return Some(Err(e));
                }
                None => {
                    self.stream = None;
                    let tail = self.decoder.finish();
                    tracing::trace!(bytes_read = self.bytes_read, "Response body ended");
                    if tail.is_empty() {
                        return None;
                    }
                    return Some(Ok(tail));
                }
            }
        }
    }

    /// Release the underlying body without reading the rest
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!(bytes_read = self.bytes_read, "Response body closed early");
        }
    }

    /// Whether the body has been fully consumed, failed or closed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stream.is_none()
    }

    /// Raw bytes received so far
    #[must_use]
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

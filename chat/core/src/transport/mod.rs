//! Transport Layer
//!
//! Turns one exchange request into a stream of decoded text fragments.
//!
//! # Pieces
//!
//! - [`QaTransport`]: issues the request and returns the raw body
//! - [`HttpTransport`]: reqwest implementation for the real endpoint
//! - [`ScriptedTransport`]: canned replies for tests and offline use
//! - [`TransportReader`]: decodes a body into text fragments, keeping
//!   multi-byte characters intact across chunk boundaries
//!
//! # Usage
//!
//! ```ignore
//! use qa_chat_core::transport::{ExchangeRequest, HttpTransport, QaTransport, TransportReader};
//!
//! let transport = HttpTransport::new("http://localhost:8000/api/v1/qa");
//! let body = transport.open(&ExchangeRequest::new(vec![], "Hello")).await?;
//! let mut reader = TransportReader::new(body.expect("body"));
//! while let Some(fragment) = reader.next_fragment().await {
//!     print!("{}", fragment?);
//! }
//! ```

mod decoder;
mod http;
mod reader;
mod scripted;
mod traits;

pub use decoder::Utf8StreamDecoder;
pub use http::HttpTransport;
pub use reader::TransportReader;
pub use scripted::{ScriptedReply, ScriptedTransport};
pub use traits::{ByteStream, ExchangeRequest, QaTransport};

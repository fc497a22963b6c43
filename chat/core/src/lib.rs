//! QA Chat Core - Headless Streaming Exchange Client
//!
//! This crate holds the client side of a streaming question-answering chat,
//! independent of any terminal or UI framework. It turns one question into a
//! sequence of partial-reply updates, commits the finished answer into the
//! conversation, and keeps the session idle-consistent on every failure.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Rendering Surface                        │
//! │          (qa-chat CLI, tests, any embedder)                  │
//! └───────────────┬─────────────────────────────▲────────────────┘
//!                 │ send / regenerate            │ SurfaceMessage
//! ┌───────────────▼─────────────────────────────┴────────────────┐
//! │                   ExchangeController                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌────────────────┐  │
//! │  │ ChatSession  │  │ StreamAccumulator│  │ TransportReader│  │
//! │  │ (log, busy)  │  │ (stream buffer)  │  │ (UTF-8 decode) │  │
//! │  └──────────────┘  └──────────────────┘  └───────┬────────┘  │
//! └──────────────────────────────────────────────────┼───────────┘
//!                                                    │ QaTransport
//!                                         POST /api/v1/qa (streamed)
//! ```
//!
//! # Key Types
//!
//! - [`ExchangeController`]: runs `send` and `regenerate`, one at a time
//! - [`ChatSession`]: conversation log, stream buffer and busy flag
//! - [`SurfaceMessage`]: ordered state changes pushed to the surface
//! - [`QaTransport`]: the endpoint seam ([`HttpTransport`], [`ScriptedTransport`])
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use qa_chat_core::{ChatSession, ExchangeController, HttpTransport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let transport = Arc::new(HttpTransport::new("http://localhost:8000/api/v1/qa"));
//!     let mut controller = ExchangeController::new(transport, Arc::new(ChatSession::new()));
//!     let mut updates = controller.subscribe();
//!
//!     tokio::spawn(async move {
//!         while let Some(msg) = updates.recv().await {
//!             // render msg
//!         }
//!     });
//!
//!     let answer = controller.send("What is an ACS skills assessment?").await;
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`turn`]: roles and finalized turns
//! - [`conversation`]: the ordered turn log
//! - [`accumulator`]: running concatenation of reply fragments
//! - [`transport`]: endpoint seam, HTTP client and incremental decoding
//! - [`session`]: shared session state read by surfaces
//! - [`exchange`]: the exchange controller
//! - [`messages`]: messages from the controller to surfaces
//! - [`clipboard`]: copy-a-turn passthrough
//! - [`config`]: layered client configuration
//! - [`error`]: exchange errors

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod accumulator;
pub mod clipboard;
pub mod config;
pub mod conversation;
pub mod error;
pub mod exchange;
pub mod messages;
pub mod session;
pub mod transport;
pub mod turn;

// Re-exports for convenience
pub use accumulator::StreamAccumulator;
pub use clipboard::{copy_turn, Clipboard, ClipboardError};
pub use conversation::ConversationState;
pub use error::ExchangeError;
pub use exchange::ExchangeController;
pub use messages::SurfaceMessage;
pub use session::{ChatSession, SessionSnapshot};
pub use transport::{
    ByteStream, ExchangeRequest, HttpTransport, QaTransport, ScriptedReply, ScriptedTransport,
    TransportReader, Utf8StreamDecoder,
};
pub use turn::{Role, Turn};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ClientConfig, ClientToml,
    ConfigError, ConfigOverrides, ConfigSource,
};

//! Clipboard passthrough
//!
//! Copying a turn is a read-only convenience for surfaces. It never touches
//! the exchange protocol; the system clipboard itself lives with the surface.

use thiserror::Error;

use crate::session::ChatSession;

/// Errors from copying a turn
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// No turn exists at the requested position
    #[error("No turn at index {0}")]
    NoSuchTurn(usize),

    /// The clipboard backend refused the text
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
}

/// A place text can be copied to
pub trait Clipboard {
    /// Replace the clipboard contents with `text`
    ///
    /// # Errors
    ///
    /// Returns [`ClipboardError::Unavailable`] when the backend fails.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Copy the text of turn `index` to `clipboard`
///
/// # Errors
///
/// Returns [`ClipboardError::NoSuchTurn`] for an out-of-range index, or the
/// backend's error.
pub fn copy_turn<C: Clipboard + ?Sized>(
    session: &ChatSession,
    index: usize,
    clipboard: &mut C,
) -> Result<usize, ClipboardError> {
    let text = session
        .turn_text(index)
        .ok_or(ClipboardError::NoSuchTurn(index))?;
    clipboard.set_text(&text)?;
    tracing::debug!(index, chars = text.chars().count(), "Copied turn to clipboard");
    Ok(text.len())
}

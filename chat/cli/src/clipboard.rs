//! System clipboard backed by `arboard`

use qa_chat_core::{Clipboard, ClipboardError};

/// Opens the platform clipboard on first use
///
/// Headless sessions (no display server) only fail when `/copy` is used,
/// not at startup.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => {
                tracing::debug!("opening system clipboard");
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?
            }
        };
        let clipboard = self.inner.insert(clipboard);

        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
    }
}

//! Stream Accumulator
//!
//! Owns the in-progress assistant reply for the exchange in flight. Each
//! fragment is appended verbatim; the running total is what surfaces render
//! while the reply streams in.

/// Running concatenation of fragments for one exchange
#[derive(Clone, Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    fragments: u32,
}

impl StreamAccumulator {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all accumulated text
    pub fn reset(&mut self) {
        self.content.clear();
        self.fragments = 0;
    }

    /// Append a fragment and return the new running total
    pub fn push(&mut self, fragment: &str) -> &str {
        self.content.push_str(fragment);
        self.fragments += 1;
        &self.content
    }

    /// Current running total
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Whether nothing has been accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of fragments appended since the last reset
    #[must_use]
    pub fn fragment_count(&self) -> u32 {
        self.fragments
    }

    /// Move the running total out, leaving the accumulator empty
    pub fn take(&mut self) -> String {
        self.fragments = 0;
        std::mem::take(&mut self.content)
    }
}

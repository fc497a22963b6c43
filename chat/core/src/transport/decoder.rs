//! Incremental UTF-8 decoding
//!
//! Network chunks split text at arbitrary byte offsets, so a multi-byte
//! character can straddle two chunks. The decoder holds back an incomplete
//! trailing sequence until the bytes that finish it arrive.

/// Streaming UTF-8 decoder
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    /// Incomplete trailing sequence from the previous chunk (at most 3 bytes)
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    /// Create a decoder with no pending bytes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a chunk, carrying any incomplete tail into the next call
    ///
    /// Invalid sequences become U+FFFD.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest = input.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // prefix up to valid_up_to is always UTF-8
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of stream
    ///
    /// A sequence that never completed decodes as a single U+FFFD.
    pub fn finish(&mut self) -> String {
        // a browser streaming TextDecoder would drop these bytes silently
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            char::REPLACEMENT_CHARACTER.to_string()
        }
    }

    /// Whether bytes are being held back
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

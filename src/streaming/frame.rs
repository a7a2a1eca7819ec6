/// Accumulates raw response bytes into complete SSE frames.
///
/// Bytes arrive in arbitrary-sized chunks, so both a multi-byte UTF-8
/// character and the blank-line frame delimiter may be split across chunk
/// boundaries. Incomplete trailing bytes are carried between pushes.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    /// Decoded text not yet consumed as a frame
    text: String,
    /// Trailing bytes of an incomplete UTF-8 sequence
    pending: Vec<u8>,
}

/// Frame delimiters, matched at the earliest position
const DELIMITERS: [&str; 2] = ["\r\n\r\n", "\n\n"];

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk, decoding the longest valid UTF-8 prefix.
    ///
    /// Invalid sequences are dropped; an incomplete trailing sequence is
    /// retained and completed by the next push.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid_up_to = err.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid_up_to]));

                    match err.error_len() {
                        // Invalid sequence: skip it and keep decoding
                        Some(len) => {
                            self.pending.drain(..valid_up_to + len);
                        }
                        // Incomplete trailing sequence: keep for the next chunk
                        None => {
                            self.pending.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Remove and return the earliest complete frame, without its delimiter.
    pub fn next_frame(&mut self) -> Option<String> {
        let (start, len) = DELIMITERS
            .iter()
            .filter_map(|d| self.text.find(d).map(|pos| (pos, d.len())))
            .min()?;

        let frame = self.text[..start].to_string();
        self.text.drain(..start + len);
        Some(frame)
    }

    /// Drain any trailing text once the stream has ended.
    ///
    /// A producer that closes the connection without a final blank line
    /// leaves its last frame unterminated in the buffer.
    pub fn take_remainder(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}

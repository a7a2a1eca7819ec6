use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::{ChatError, Result};
use crate::streaming::frame::FrameBuffer;
use crate::transport::ByteStream;

/// Terminal marker: the producer has finished and no further frames follow
const DONE_SENTINEL: &str = "[DONE]";

/// Payload line prefix; all other lines are ignored
const DATA_PREFIX: &str = "data:";

/// JSON pointer selecting the incremental-text field inside a payload.
///
/// The default matches the Chat Completions streaming schema. The path is
/// a parameter rather than a constant: the response schema is defined by
/// the upstream service and can drift independently of this decoder.
#[derive(Debug, Clone)]
pub struct DeltaPath(String);

impl DeltaPath {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self(pointer.into())
    }

    /// Resolve the path inside a parsed payload, if it leads to a string.
    pub fn extract<'a>(&self, payload: &'a serde_json::Value) -> Option<&'a str> {
        payload.pointer(&self.0)?.as_str()
    }
}

impl Default for DeltaPath {
    fn default() -> Self {
        Self("/choices/0/delta/content".to_string())
    }
}

type TokenCallback = Box<dyn FnMut(&str, &str) + Send>;
type DoneCallback = Box<dyn FnMut(&str) + Send>;

/// Decodes a live chunked byte stream into an ordered sequence of text
/// deltas and a final accumulated string.
///
/// One instance serves one streaming request; `run` consumes it. Frames
/// whose payload is not valid JSON, or lacks the delta field, contribute
/// nothing and do not abort the stream.
pub struct StreamDecoder {
    delta_path: DeltaPath,
    frames: FrameBuffer,
    full_text: String,
    on_token: Option<TokenCallback>,
    on_done: Option<DoneCallback>,
    cancel: Option<CancellationToken>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            delta_path: DeltaPath::default(),
            frames: FrameBuffer::new(),
            full_text: String::new(),
            on_token: None,
            on_done: None,
            cancel: None,
        }
    }

    /// Override the JSON pointer used to extract deltas
    pub fn delta_path(mut self, path: DeltaPath) -> Self {
        self.delta_path = path;
        self
    }

    /// Invoked once per parsed delta with `(delta, full_text_so_far)`,
    /// in stream order
    pub fn on_token(mut self, f: impl FnMut(&str, &str) + Send + 'static) -> Self {
        self.on_token = Some(Box::new(f));
        self
    }

    /// Invoked exactly once when the stream terminates, with the full
    /// accumulated text (partial text on cancellation)
    pub fn on_done(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.on_done = Some(Box::new(f));
        self
    }

    /// Abort the stream when `token` is cancelled
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Consume the byte stream until the terminal sentinel, end-of-input,
    /// cancellation, or a transport read error.
    ///
    /// Returns the accumulated full text. On cancellation `on_done` still
    /// fires with the partial text, but the caller gets
    /// [`ChatError::Cancelled`] so the outcome stays distinguishable.
    pub async fn run(mut self, mut stream: ByteStream) -> Result<String> {
        let cancel = self.cancel.take();

        loop {
            let next = match &cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            debug!("Stream cancelled after {} chars", self.full_text.len());
                            self.finish();
                            return Err(ChatError::Cancelled);
                        }
                        chunk = stream.next() => chunk,
                    }
                }
                None => stream.next().await,
            };

            match next {
                Some(Ok(chunk)) => {
                    self.frames.push_bytes(&chunk);
                    while let Some(frame) = self.frames.next_frame() {
                        if self.process_frame(&frame) {
                            // Sentinel seen: any frames still buffered
                            // are never processed
                            return Ok(self.finish());
                        }
                    }
                }
                Some(Err(e)) => return Err(e),
                None => {
                    let tail = self.frames.take_remainder();
                    if !tail.is_empty() {
                        self.process_frame(&tail);
                    }
                    return Ok(self.finish());
                }
            }
        }
    }

    /// Process one frame's lines; returns true when the sentinel is seen.
    fn process_frame(&mut self, frame: &str) -> bool {
        for line in frame.lines() {
            let line = line.trim();

            // Comments (": keep-alive") and blank lines carry nothing
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim();

            if payload == DONE_SENTINEL {
                return true;
            }

            let Ok(parsed) = serde_json::from_str::<serde_json::Value>(payload) else {
                trace!("Skipping non-JSON payload line");
                continue;
            };

            let Some(delta) = self.delta_path.extract(&parsed) else {
                continue;
            };
            if delta.is_empty() {
                continue;
            }

            self.full_text.push_str(delta);
            if let Some(on_token) = &mut self.on_token {
                on_token(delta, &self.full_text);
            }
        }

        false
    }

    /// Fire `on_done` (at most once) and yield the accumulated text.
    fn finish(&mut self) -> String {
        if let Some(mut on_done) = self.on_done.take() {
            on_done(&self.full_text);
        }
        std::mem::take(&mut self.full_text)
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

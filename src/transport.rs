use bytes::Bytes;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Type alias for the streaming response body from a transport
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Type alias for the future returned by stream_chat
pub type StreamFuture = Pin<Box<dyn Future<Output = Result<ByteStream>> + Send>>;

/// Trait for transports capable of streaming a chat completion response
///
/// Decouples the stream decoder from any concrete HTTP implementation;
/// tests substitute in-memory transports.
pub trait Transport: Send + Sync {
    /// Send the serialized request body and return the raw byte stream
    /// of the response.
    ///
    /// Implementations must fail before yielding a stream if the response
    /// indicates a non-success status or carries no readable body.
    fn stream_chat(&self, body: Bytes) -> StreamFuture;

    /// Get the transport name for logging
    fn name(&self) -> &str;
}

//! # chat-stream
//!
//! A streaming chat completion client with incremental SSE decoding.
//!
//! ## Overview
//!
//! This library turns the chunked byte stream of an OpenAI-compatible
//! `/v1/chat/completions` response into an ordered sequence of text deltas
//! delivered via callback, plus a final accumulated string.
//!
//! The core pieces:
//! - Incremental frame buffering that is invariant to chunk boundaries
//!   (multi-byte characters and frame delimiters may be split anywhere)
//! - Per-frame `data:` payload extraction with a configurable JSON pointer
//! - Best-effort per-frame error handling: a corrupt frame is skipped, the
//!   stream continues
//! - Cooperative cancellation via `CancellationToken`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat_stream::{ChatClient, ChatConfig, StreamDecoder};
//! use chat_stream::models::{ChatMessage, ChatRequest};
//!
//! # async fn demo() -> chat_stream::Result<()> {
//! let config = ChatConfig::from_env()?;
//! let client = ChatClient::new(config.api.clone())?;
//!
//! let request = ChatRequest {
//!     model: config.api.model.clone(),
//!     messages: vec![ChatMessage::user("Hello!")],
//!     temperature: Some(config.api.temperature),
//!     max_tokens: None,
//!     stream: true,
//! };
//!
//! let decoder = StreamDecoder::new().on_token(|delta, _full| print!("{delta}"));
//! let full_text = chat_stream::client::stream_completion(&client, &request, decoder).await?;
//! # let _ = full_text;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`client`] - HTTP client and request orchestration
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and handling
//! - [`models`] - Request data structures
//! - [`streaming`] - Frame buffer and stream decoder
//! - [`transport`] - Transport trait decoupling decoder from HTTP

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod streaming;
pub mod transport;

pub use client::ChatClient;
pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use streaming::{DeltaPath, StreamDecoder};
pub use transport::{ByteStream, Transport};

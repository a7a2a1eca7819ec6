use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chat_stream::client::stream_completion;
use chat_stream::models::{ChatMessage, ChatRequest};
use chat_stream::transport::{ByteStream, StreamFuture, Transport};
use chat_stream::{ChatError, StreamDecoder};
use futures::stream;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

fn request() -> ChatRequest {
    ChatRequest {
        model: "gpt-4o-mini".to_string(),
        messages: vec![ChatMessage::user("Hello")],
        temperature: Some(0.7),
        max_tokens: None,
        stream: false,
    }
}

/// Transport that fails before yielding a stream, as a real client does on
/// a non-success HTTP status
struct FailingTransport;

impl Transport for FailingTransport {
    fn stream_chat(&self, _body: Bytes) -> StreamFuture {
        Box::pin(async {
            Err(ChatError::Transport(
                "Upstream error 500 Internal Server Error: boom".to_string(),
            ))
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Transport that records the request body and replays canned chunks
struct CannedTransport {
    chunks: Vec<Vec<u8>>,
    seen_body: Arc<Mutex<Option<Vec<u8>>>>,
}

impl Transport for CannedTransport {
    fn stream_chat(&self, body: Bytes) -> StreamFuture {
        *self.seen_body.lock().unwrap() = Some(body.to_vec());
        let items: Vec<chat_stream::Result<Bytes>> = self
            .chunks
            .clone()
            .into_iter()
            .map(|c| Ok(Bytes::from(c)))
            .collect();
        Box::pin(async move {
            let stream: ByteStream = Box::pin(stream::iter(items));
            Ok(stream)
        })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[tokio::test]
async fn test_transport_failure_fires_no_callbacks() {
    let calls = Arc::new(Mutex::new(0usize));
    let token_calls = calls.clone();
    let done_calls = calls.clone();

    let decoder = StreamDecoder::new()
        .on_token(move |_, _| *token_calls.lock().unwrap() += 1)
        .on_done(move |_| *done_calls.lock().unwrap() += 1);

    let result = stream_completion(&FailingTransport, &request(), decoder).await;

    let err = result.unwrap_err();
    assert!(matches!(err, ChatError::Transport(_)));
    assert!(err.to_string().contains("500"));
    assert_eq!(*calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_mid_stream_read_error_is_fatal() {
    let done_calls = Arc::new(Mutex::new(0usize));
    let counter = done_calls.clone();
    let decoder = StreamDecoder::new().on_done(move |_| *counter.lock().unwrap() += 1);

    let items: Vec<chat_stream::Result<Bytes>> = vec![
        Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n\n",
        )),
        Err(ChatError::Transport(
            "Read failed: connection reset".to_string(),
        )),
    ];
    let stream: ByteStream = Box::pin(stream::iter(items));

    let result = decoder.run(stream).await;

    assert!(matches!(result, Err(ChatError::Transport(_))));
    assert_eq!(*done_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_cancellation_yields_partial_text() {
    let cancel = CancellationToken::new();
    let done: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let done_log = done.clone();

    // Cancel from inside the first token callback; the stream itself
    // never ends on its own
    let trip = cancel.clone();
    let decoder = StreamDecoder::new()
        .cancellation(cancel)
        .on_token(move |_, _| trip.cancel())
        .on_done(move |full| done_log.lock().unwrap().push(full.to_string()));

    let items: Vec<chat_stream::Result<Bytes>> = vec![Ok(Bytes::from_static(
        b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
    ))];
    let stream: ByteStream = Box::pin(stream::iter(items).chain(stream::pending()));

    let result = decoder.run(stream).await;

    assert!(matches!(result, Err(ChatError::Cancelled)));
    assert_eq!(*done.lock().unwrap(), vec!["partial".to_string()]);
}

#[tokio::test]
async fn test_stream_completion_forces_streaming() {
    let seen_body = Arc::new(Mutex::new(None));
    let transport = CannedTransport {
        chunks: vec![
            b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n".to_vec(),
            b"data: [DONE]\n\n".to_vec(),
        ],
        seen_body: seen_body.clone(),
    };

    // Request arrives with stream:false; orchestration must flip it
    let result = stream_completion(&transport, &request(), StreamDecoder::new())
        .await
        .unwrap();
    assert_eq!(result, "ok");

    let body = seen_body.lock().unwrap().clone().unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(sent["stream"], serde_json::Value::Bool(true));
    assert_eq!(sent["model"], "gpt-4o-mini");
}

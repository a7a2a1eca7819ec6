use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::{ChatError, Result};
use crate::models::ChatRequest;
use crate::streaming::StreamDecoder;
use crate::transport::{ByteStream, StreamFuture, Transport};

/// HTTP client for OpenAI-compatible chat completion endpoints
pub struct ChatClient {
    client: Client,
    config: ApiConfig,
}

impl ChatClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ChatError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

impl Transport for ChatClient {
    fn stream_chat(&self, body: Bytes) -> StreamFuture {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);
        let client = self.client.clone();
        let api_key = self.config.api_key.clone();

        Box::pin(async move { Self::stream_chat_impl(url, body, client, api_key).await })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}

impl ChatClient {
    async fn stream_chat_impl(
        url: String,
        body: Bytes,
        client: Client,
        api_key: String,
    ) -> Result<ByteStream> {
        let request_id = Uuid::new_v4();
        info!(%request_id, "Sending {} bytes to: {}", body.len(), url);

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .bearer_auth(&api_key)
            .body(body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        info!(%request_id, "Upstream responded with status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(ChatError::Transport(format!(
                "Upstream error {}: {}",
                status, error_body
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ChatError::Transport(format!("Read failed: {}", e))));

        Ok(Box::pin(stream))
    }
}

/// Stream one chat completion through `transport` and decode it with `decoder`.
///
/// Forces `stream: true` on the request, dispatches it, and runs the decoder
/// over the resulting byte stream. Returns the accumulated full text.
pub async fn stream_completion(
    transport: &dyn Transport,
    request: &ChatRequest,
    decoder: StreamDecoder,
) -> Result<String> {
    let mut request = request.clone();
    request.stream = true;

    let body = Bytes::from(serde_json::to_vec(&request)?);
    debug!(
        transport = transport.name(),
        model = %request.model,
        bytes = body.len(),
        "Dispatching chat completion"
    );

    let stream = transport.stream_chat(body).await?;
    decoder.run(stream).await
}

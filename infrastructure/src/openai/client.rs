//! Streaming client for OpenAI-compatible chat completion endpoints.

use super::sse::{DONE_SENTINEL, SseBuffer, parse_data_lines};
use super::types::{ChatCompletionBody, ChatCompletionChunk};
use async_trait::async_trait;
use chatstream_application::ports::completion_client::{
    CompletionClient, CompletionRequest, StreamHandle, UpstreamError,
};
use chatstream_domain::StreamEvent;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Buffered events between the body reader task and the consumer.
const STREAM_BUFFER: usize = 64;

pub struct OpenAiCompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    response_timeout: Duration,
}

impl OpenAiCompletionClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a client.
    ///
    /// `response_timeout` bounds the wait for response headers only; a
    /// stream that has started may run for as long as the upstream keeps
    /// sending.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        response_timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(response_timeout)
            .build()
            .map_err(|e| UpstreamError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            response_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn open(&self, request: CompletionRequest) -> Result<StreamHandle, UpstreamError> {
        if request.messages.is_empty() {
            return Err(UpstreamError::InvalidRequest(
                "request has no messages".to_string(),
            ));
        }

        let body = ChatCompletionBody::from(&request);
        let mut builder = self.http.post(self.endpoint()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(
            "POST {} (model {}, {} messages)",
            self.endpoint(),
            request.model,
            request.messages.len()
        );

        let response = match tokio::time::timeout(self.response_timeout, builder.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(UpstreamError::Connection(e.to_string())),
            Err(_) => {
                return Err(UpstreamError::Connection(format!(
                    "no response within {}s",
                    self.response_timeout.as_secs()
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        tokio::spawn(forward_events(response, tx));
        Ok(StreamHandle::new(rx))
    }
}

/// Read the SSE body and translate it into [`StreamEvent`]s.
///
/// Always ends the channel with exactly one terminal event, unless the
/// receiver went away first. A body that ends without the `[DONE]`
/// sentinel counts as a normal end.
async fn forward_events(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut bytes = response.bytes_stream();
    let mut buffer = SseBuffer::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        };
        buffer.push_chunk(&chunk);

        while let Some(block) = buffer.next_event_block() {
            if let Flow::Stop = forward_block(&block, &tx).await {
                return;
            }
        }
    }

    if let Some(block) = buffer.take_remainder()
        && let Flow::Stop = forward_block(&block, &tx).await
    {
        return;
    }
    let _ = tx.send(StreamEvent::Completed).await;
}

enum Flow {
    Continue,
    Stop,
}

async fn forward_block(block: &str, tx: &mpsc::Sender<StreamEvent>) -> Flow {
    for data in parse_data_lines(block) {
        if data.trim() == DONE_SENTINEL {
            let _ = tx.send(StreamEvent::Completed).await;
            return Flow::Stop;
        }

        let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!("Undecodable stream chunk: {}", e);
                let _ = tx
                    .send(StreamEvent::Error(format!("undecodable stream chunk: {e}")))
                    .await;
                return Flow::Stop;
            }
        };

        if let Some(error) = chunk.error {
            let _ = tx.send(StreamEvent::Error(error.message)).await;
            return Flow::Stop;
        }

        if let Some(text) = chunk.first_choice_text()
            && tx.send(StreamEvent::Delta(text.to_string())).await.is_err()
        {
            debug!("Stream receiver dropped, closing upstream body");
            return Flow::Stop;
        }
    }
    Flow::Continue
}

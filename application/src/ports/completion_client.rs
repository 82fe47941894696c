//! Completion Client port
//!
//! Defines the interface for opening a streamed completion against an
//! upstream model provider.

use async_trait::async_trait;
use chatstream_domain::{Role, StreamEvent};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// The upstream rejected or could not accept the request before streaming began.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// The stream terminated abnormally after it was opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("upstream stream failed: {0}")]
    Upstream(String),

    #[error("stream closed before completion")]
    Closed,
}

/// One `(role, content)` pair of a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

/// A provider-neutral streamed completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<RequestMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    /// `None` lets the provider pick its default output cap.
    pub max_tokens: Option<u32>,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stream: bool,
}

/// Handle for receiving streaming events from an upstream completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`; the adapter owns the sender.
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamEvent>,
    finished: bool,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self {
            receiver,
            finished: false,
        }
    }

    /// Receive the next text delta.
    ///
    /// - `Ok(Some(delta))` for each chunk
    /// - `Ok(None)` once the upstream signalled the end of the stream
    /// - `Err(StreamError::Upstream)` on a mid-stream failure
    /// - `Err(StreamError::Closed)` if the sender went away without a
    ///   terminal event
    pub async fn receive(&mut self) -> Result<Option<String>, StreamError> {
        if self.finished {
            return Ok(None);
        }
        match self.receiver.recv().await {
            Some(StreamEvent::Delta(chunk)) => Ok(Some(chunk)),
            Some(StreamEvent::Completed) => {
                self.finished = true;
                Ok(None)
            }
            Some(StreamEvent::Error(e)) => Err(StreamError::Upstream(e)),
            None => Err(StreamError::Closed),
        }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, StreamError> {
        let mut full_text = String::new();
        while let Some(chunk) = self.receive().await? {
            full_text.push_str(&chunk);
        }
        Ok(full_text)
    }
}

/// Client for streamed completions
///
/// This port defines how the application layer talks to a model provider.
/// Implementations (adapters) live in the infrastructure layer and own
/// timeouts and retries.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Open a streamed completion.
    async fn open(&self, request: CompletionRequest) -> Result<StreamHandle, UpstreamError>;
}

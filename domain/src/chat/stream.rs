//! Streaming events for upstream completion responses.
//!
//! [`StreamEvent`] bridges infrastructure-level streaming (e.g. SSE chunks
//! from an OpenAI-compatible endpoint) to the application layer.

/// An event in a streaming completion response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// Normal end of stream.
    Completed,
    /// The upstream failed mid-stream.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed | StreamEvent::Error(_))
    }
}

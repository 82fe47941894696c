//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording chat transcript
//! events (session creation, user and assistant turns, evictions, saves) to
//! a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! conversation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "user_message", "messages_evicted").
    pub event_type: &'static str,
    /// Chat session the event belongs to.
    pub chat_id: String,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, chat_id: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type,
            chat_id: chat_id.into(),
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// The `log` method is synchronous and non-fallible so it never disrupts
/// the completion pipeline; implementations swallow write failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

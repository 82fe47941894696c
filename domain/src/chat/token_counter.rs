//! Token counting abstraction.
//!
//! The tokenizer itself lives outside the domain. A [`Message`](super::message::Message)
//! asks the counter exactly once, at construction, and keeps the result.

use thiserror::Error;

/// Failure reported by a [`TokenCounter`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("token counting failed for model {model}: {reason}")]
pub struct TokenCountError {
    pub model: String,
    pub reason: String,
}

impl TokenCountError {
    pub fn new(model: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            reason: reason.into(),
        }
    }
}

/// Counts tokens of a text for a given model.
///
/// Implementations must be pure and deterministic for a given
/// `(model_identifier, text)` pair.
pub trait TokenCounter: Send + Sync {
    fn count(&self, model_identifier: &str, text: &str) -> Result<usize, TokenCountError>;
}

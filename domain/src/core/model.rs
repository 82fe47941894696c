//! Model value object representing an LLM model and its context budget

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// An LLM model together with its context window size (Value Object)
///
/// `max_tokens` is the total budget the active window of a chat may occupy.
/// It is unrelated to the per-response output cap in
/// [`ChatConfig`](crate::chat::config::ChatConfig).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Model {
    identifier: String,
    max_tokens: usize,
}

impl Model {
    /// Create a model, rejecting an empty identifier or a zero budget.
    pub fn new(identifier: impl Into<String>, max_tokens: usize) -> Result<Self, DomainError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(DomainError::validation("model identifier is empty"));
        }
        if max_tokens == 0 {
            return Err(DomainError::validation("model max tokens must be positive"));
        }
        Ok(Self {
            identifier,
            max_tokens,
        })
    }

    /// Get the string identifier for this model
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} tokens)", self.identifier, self.max_tokens)
    }
}

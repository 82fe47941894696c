//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed construction input (empty content, bad config bounds, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation is not allowed in the current status.
    #[error("Invalid state: {0}")]
    State(String),

    /// A single message does not fit into the model budget, even with an
    /// empty window.
    #[error("Message needs {required} tokens but the model allows at most {limit}")]
    Capacity { required: usize, limit: usize },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        DomainError::State(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, DomainError::State(_))
    }

    pub fn is_capacity(&self) -> bool {
        matches!(self, DomainError::Capacity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_error_display() {
        let error = DomainError::Capacity {
            required: 12,
            limit: 10,
        };
        assert_eq!(
            error.to_string(),
            "Message needs 12 tokens but the model allows at most 10"
        );
    }

    #[test]
    fn test_kind_checks() {
        assert!(DomainError::validation("content is empty").is_validation());
        assert!(DomainError::state("chat is ended").is_state());
        assert!(
            DomainError::Capacity {
                required: 1,
                limit: 0
            }
            .is_capacity()
        );
        assert!(!DomainError::state("x").is_validation());
    }
}

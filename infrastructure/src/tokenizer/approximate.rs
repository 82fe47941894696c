//! Character-ratio token estimate.

use chatstream_domain::{TokenCountError, TokenCounter};

/// Estimates tokens as `ceil(chars / chars_per_token)`.
///
/// Deterministic and model-agnostic; good enough to keep a window under an
/// upstream context limit when a real tokenizer is not available.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateTokenCounter {
    chars_per_token: usize,
}

impl ApproximateTokenCounter {
    pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

    pub fn new() -> Self {
        Self {
            chars_per_token: Self::DEFAULT_CHARS_PER_TOKEN,
        }
    }

    /// Use a custom ratio. A ratio of zero is treated as one.
    pub fn with_chars_per_token(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }
}

impl Default for ApproximateTokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for ApproximateTokenCounter {
    fn count(&self, model_identifier: &str, text: &str) -> Result<usize, TokenCountError> {
        if model_identifier.is_empty() {
            return Err(TokenCountError::new(model_identifier, "no model given"));
        }
        Ok(text.chars().count().div_ceil(self.chars_per_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_up() {
        let counter = ApproximateTokenCounter::new();
        assert_eq!(counter.count("m", "abcd").unwrap(), 1);
        assert_eq!(counter.count("m", "abcde").unwrap(), 2);
        assert_eq!(counter.count("m", "").unwrap(), 0);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let counter = ApproximateTokenCounter::new();
        // four chars, twelve bytes
        assert_eq!(counter.count("m", "日本語だ").unwrap(), 1);
    }

    #[test]
    fn test_custom_ratio() {
        let counter = ApproximateTokenCounter::with_chars_per_token(1);
        assert_eq!(counter.count("m", "hello").unwrap(), 5);
        assert_eq!(
            ApproximateTokenCounter::with_chars_per_token(0).chars_per_token(),
            1
        );
    }

    #[test]
    fn test_empty_model_is_rejected() {
        let counter = ApproximateTokenCounter::new();
        assert!(counter.count("", "hello").is_err());
    }
}

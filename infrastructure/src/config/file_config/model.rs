//! Model configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};

/// Model selection and context budget.
///
/// # Example
///
/// ```toml
/// [model]
/// name = "gpt-4o-mini"
/// max_tokens = 8192
/// chars_per_token = 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Upstream model identifier
    pub name: String,
    /// Context budget for the active window, in tokens
    pub max_tokens: usize,
    /// Ratio used by the approximate token counter
    pub chars_per_token: usize,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: "gpt-4o-mini".to_string(),
            max_tokens: 8192,
            chars_per_token: 4,
        }
    }
}

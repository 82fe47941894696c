//! Upstream configuration from TOML (`[upstream]` section)

use serde::{Deserialize, Serialize};

/// OpenAI-compatible endpoint settings.
///
/// # Example
///
/// ```toml
/// [upstream]
/// base_url = "http://localhost:11434/v1"
/// api_key_env = "LOCAL_LLM_KEY"
/// timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUpstreamConfig {
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Wait for response headers, in seconds
    pub timeout_seconds: u64,
}

impl Default for FileUpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl FileUpstreamConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

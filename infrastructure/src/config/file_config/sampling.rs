//! Sampling configuration from TOML (`[sampling]` section)

use serde::{Deserialize, Serialize};

/// Per-request sampling parameters for new chats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    /// Output cap per response (0 = provider default)
    pub max_output_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
}

impl Default for FileSamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_output_tokens: 0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

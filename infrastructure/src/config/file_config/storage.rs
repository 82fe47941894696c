//! Storage and transcript settings from TOML (`[storage]`, `[logging]`)

use serde::{Deserialize, Serialize};

/// Where chat sessions live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per chat
    #[default]
    File,
    /// Process memory, lost on exit
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    pub backend: StorageBackend,
    /// Session directory (default: `<data dir>/chatstream/sessions`)
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript path; unset disables transcript logging
    pub conversation_log: Option<String>,
}

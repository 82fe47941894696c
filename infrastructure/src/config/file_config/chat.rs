//! Chat defaults from TOML (`[chat]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// System message that opens every new chat
    pub initial_system_message: String,
    /// User id recorded as the owner of new chats
    pub owner: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            initial_system_message: "You are a helpful assistant.".to_string(),
            owner: "local".to_string(),
        }
    }
}

//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application inputs.

mod chat;
mod model;
mod repl;
mod sampling;
mod storage;
mod upstream;

pub use chat::FileChatConfig;
pub use model::FileModelConfig;
pub use repl::FileReplConfig;
pub use sampling::FileSamplingConfig;
pub use storage::{FileLoggingConfig, FileStorageConfig, StorageBackend};
pub use upstream::FileUpstreamConfig;

use chatstream_application::ChatCompletionConfigInput;
use chatstream_domain::{ChatConfig, Model};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.max_tokens must be positive")]
    ZeroModelBudget,

    #[error("model.chars_per_token must be positive")]
    ZeroCharsPerToken,

    #[error("sampling: {0}")]
    InvalidSampling(String),

    #[error("chat.initial_system_message cannot be empty")]
    EmptySystemMessage,

    #[error("chat.owner cannot be empty")]
    EmptyOwner,

    #[error("upstream.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("upstream.timeout_seconds cannot be 0")]
    InvalidTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: FileModelConfig,
    pub sampling: FileSamplingConfig,
    pub chat: FileChatConfig,
    pub upstream: FileUpstreamConfig,
    pub storage: FileStorageConfig,
    pub logging: FileLoggingConfig,
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        if self.model.name.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.model.max_tokens == 0 {
            issues.push(ConfigValidationError::ZeroModelBudget);
        }
        if self.model.chars_per_token == 0 {
            issues.push(ConfigValidationError::ZeroCharsPerToken);
        }

        // Sampling bounds are owned by the domain; borrow its checks.
        if let Ok(model) = Model::new(self.model.name.as_str(), self.model.max_tokens) {
            let sampling = &self.sampling;
            let config = ChatConfig::new(model)
                .with_temperature(sampling.temperature)
                .with_top_p(sampling.top_p)
                .with_n(sampling.n)
                .with_presence_penalty(sampling.presence_penalty)
                .with_frequency_penalty(sampling.frequency_penalty);
            issues.extend(
                config
                    .validate()
                    .into_iter()
                    .map(ConfigValidationError::InvalidSampling),
            );
        }

        if self.chat.initial_system_message.is_empty() {
            issues.push(ConfigValidationError::EmptySystemMessage);
        }
        if self.chat.owner.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyOwner);
        }
        if self.upstream.base_url.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyBaseUrl);
        }
        if self.upstream.timeout_seconds == 0 {
            issues.push(ConfigValidationError::InvalidTimeout);
        }

        issues
    }

    /// Settings applied when a chat is created.
    pub fn to_completion_config(&self) -> ChatCompletionConfigInput {
        let sampling = &self.sampling;
        ChatCompletionConfigInput {
            model: self.model.name.clone(),
            model_max_tokens: self.model.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            n: sampling.n,
            stop: sampling.stop.clone(),
            max_tokens: sampling.max_output_tokens,
            presence_penalty: sampling.presence_penalty,
            frequency_penalty: sampling.frequency_penalty,
            initial_system_message: self.chat.initial_system_message.clone(),
        }
    }

    // ==================== Paths ====================

    pub fn storage_dir(&self) -> Option<PathBuf> {
        match &self.storage.dir {
            Some(dir) => Some(expand_home(dir)),
            None => data_dir().map(|d| d.join("sessions")),
        }
    }

    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.repl.history_file {
            Some(file) => Some(expand_home(file)),
            None => data_dir().map(|d| d.join("history.txt")),
        }
    }

    pub fn conversation_log_path(&self) -> Option<PathBuf> {
        self.logging.conversation_log.as_deref().map(expand_home)
    }
}

fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("chatstream"))
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

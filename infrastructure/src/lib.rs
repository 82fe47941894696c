//! Infrastructure layer for chatstream
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod openai;
pub mod scripted;
pub mod storage;
pub mod tokenizer;

// Re-export commonly used types
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, StorageBackend};
pub use logging::JsonlConversationLogger;
pub use openai::OpenAiCompletionClient;
pub use scripted::ScriptedCompletionClient;
pub use storage::{InMemoryChatGateway, JsonFileChatGateway};
pub use tokenizer::ApproximateTokenCounter;

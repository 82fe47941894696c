//! Chat Gateway port
//!
//! Defines the interface for persisting chat sessions.

use async_trait::async_trait;
use chatstream_domain::ChatSession;
use thiserror::Error;

/// Errors that can occur during chat gateway operations
#[derive(Error, Debug)]
pub enum ChatGatewayError {
    /// No session is stored under this id. The only failure that makes the
    /// completion use case create a new session.
    #[error("chat not found: {0}")]
    NotFound(String),

    #[error("chat already exists: {0}")]
    Duplicate(String),

    /// The stored revision moved since the session was loaded.
    #[error("chat {id} was modified concurrently (expected revision {expected}, found {found})")]
    Conflict { id: String, expected: u64, found: u64 },

    #[error("invalid chat id: {0}")]
    InvalidId(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ChatGatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ChatGatewayError::NotFound(_))
    }
}

/// Gateway for chat session storage
///
/// Implementations (adapters) live in the infrastructure layer. They must
/// guarantee at most one writer per session id; the completion use case
/// has no internal locking.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Store a brand-new session.
    async fn create_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError>;

    /// Load a session by id.
    async fn find_session_by_id(&self, id: &str) -> Result<ChatSession, ChatGatewayError>;

    /// Overwrite an existing session.
    async fn save_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError>;
}

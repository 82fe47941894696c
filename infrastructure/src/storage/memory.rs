//! In-memory chat gateway.

use async_trait::async_trait;
use chatstream_application::ports::chat_gateway::{ChatGateway, ChatGatewayError};
use chatstream_domain::ChatSession;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local session store.
///
/// Saves are checked against the stored revision, so two runs that loaded
/// the same revision cannot both overwrite it.
#[derive(Default)]
pub struct InMemoryChatGateway {
    sessions: RwLock<HashMap<String, ChatSession>>,
}

impl InMemoryChatGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl ChatGateway for InMemoryChatGateway {
    async fn create_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(session.id()) {
            return Err(ChatGatewayError::Duplicate(session.id().to_string()));
        }
        sessions.insert(session.id().to_string(), session.clone());
        debug!("Stored new chat {} in memory", session.id());
        Ok(())
    }

    async fn find_session_by_id(&self, id: &str) -> Result<ChatSession, ChatGatewayError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ChatGatewayError::NotFound(id.to_string()))
    }

    async fn save_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get(session.id())
            .ok_or_else(|| ChatGatewayError::NotFound(session.id().to_string()))?;

        if stored.revision() != session.revision() {
            return Err(ChatGatewayError::Conflict {
                id: session.id().to_string(),
                expected: session.revision(),
                found: stored.revision(),
            });
        }

        let mut updated = session.clone();
        updated.set_revision(session.revision() + 1);
        sessions.insert(session.id().to_string(), updated);
        Ok(())
    }
}

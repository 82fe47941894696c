//! JSON file chat gateway.
//!
//! One pretty-printed file per session at `<dir>/<id>.json`. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! never leaves a truncated session behind.

use async_trait::async_trait;
use chatstream_application::ports::chat_gateway::{ChatGateway, ChatGatewayError};
use chatstream_domain::ChatSession;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Directory-backed session store.
pub struct JsonFileChatGateway {
    dir: PathBuf,
    /// Serializes read-check-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileChatGateway {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a session id.
    ///
    /// Ids are restricted to ASCII letters, digits, `-` and `_` so they can
    /// never escape the storage directory.
    fn session_path(&self, id: &str) -> Result<PathBuf, ChatGatewayError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ChatGatewayError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }

    async fn read(&self, id: &str) -> Result<ChatSession, ChatGatewayError> {
        let path = self.session_path(id)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ChatGatewayError::NotFound(id.to_string()));
            }
            Err(e) => {
                return Err(ChatGatewayError::Storage(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        serde_json::from_str(&raw).map_err(|e| {
            ChatGatewayError::Serialization(format!("{}: {}", path.display(), e))
        })
    }

    async fn write(&self, session: &ChatSession) -> Result<(), ChatGatewayError> {
        let path = self.session_path(session.id())?;
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| ChatGatewayError::Serialization(e.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            ChatGatewayError::Storage(format!(
                "failed to create {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let tmp = self.dir.join(format!(".{}.json.tmp", session.id()));
        tokio::fs::write(&tmp, json).await.map_err(|e| {
            ChatGatewayError::Storage(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            ChatGatewayError::Storage(format!("failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Wrote chat {} to {}", session.id(), path.display());
        Ok(())
    }
}

#[async_trait]
impl ChatGateway for JsonFileChatGateway {
    async fn create_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError> {
        let _guard = self.write_lock.lock().await;
        let path = self.session_path(session.id())?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ChatGatewayError::Duplicate(session.id().to_string()));
        }
        self.write(session).await
    }

    async fn find_session_by_id(&self, id: &str) -> Result<ChatSession, ChatGatewayError> {
        self.read(id).await
    }

    async fn save_session(&self, session: &ChatSession) -> Result<(), ChatGatewayError> {
        let _guard = self.write_lock.lock().await;
        let stored = self.read(session.id()).await?;
        if stored.revision() != session.revision() {
            return Err(ChatGatewayError::Conflict {
                id: session.id().to_string(),
                expected: session.revision(),
                found: stored.revision(),
            });
        }

        let mut updated = session.clone();
        updated.set_revision(session.revision() + 1);
        self.write(&updated).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::ApproximateTokenCounter;
    use chatstream_domain::{ChatConfig, Message, Model, Role};

    fn session(id: &str, max_tokens: usize) -> ChatSession {
        let model = Model::new("test-model", max_tokens).unwrap();
        let system = Message::system("be nice", &model, &ApproximateTokenCounter::new()).unwrap();
        ChatSession::with_id(id, "user-1", system, ChatConfig::new(model)).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_preserves_window_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path().join("sessions"));
        let counter = ApproximateTokenCounter::new();

        // budget 4: "be nice" (2) + "hello there" (3) evicts the system turn
        let mut chat = session("chat_1", 4);
        let model = chat.model().clone();
        chat.add_message(Message::user("hello there", &model, &counter).unwrap())
            .unwrap();
        gateway.create_session(&chat).await.unwrap();

        let loaded = gateway.find_session_by_id("chat_1").await.unwrap();
        let window: Vec<(Role, &str)> = loaded
            .active_window()
            .map(|m| (m.role(), m.content()))
            .collect();
        assert_eq!(window, vec![(Role::User, "hello there")]);
        assert_eq!(loaded.evicted_history().len(), 1);
        assert_eq!(loaded.evicted_history()[0].content(), "be nice");
        assert_eq!(loaded.token_usage(), chat.token_usage());
        assert!(dir.path().join("sessions").join("chat_1.json").exists());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        let err = gateway.find_session_by_id("absent").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        for id in ["../escape", "a/b", "", "dot.json"] {
            let err = gateway.find_session_by_id(id).await.unwrap_err();
            assert!(matches!(err, ChatGatewayError::InvalidId(_)), "{id}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());

        let err = gateway.find_session_by_id("broken").await.unwrap_err();
        assert!(matches!(err, ChatGatewayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_edited_token_usage_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        gateway.create_session(&session("edited", 100)).await.unwrap();

        let path = dir.path().join("edited.json");
        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["token_usage"] = serde_json::json!(0);
        std::fs::write(&path, value.to_string()).unwrap();

        let err = gateway.find_session_by_id("edited").await.unwrap_err();
        assert!(matches!(err, ChatGatewayError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_create_twice_is_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        gateway.create_session(&session("c1", 100)).await.unwrap();

        let err = gateway.create_session(&session("c1", 100)).await.unwrap_err();
        assert!(matches!(err, ChatGatewayError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_stale_save_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        gateway.create_session(&session("c1", 100)).await.unwrap();

        let first = gateway.find_session_by_id("c1").await.unwrap();
        let second = gateway.find_session_by_id("c1").await.unwrap();
        gateway.save_session(&first).await.unwrap();

        let err = gateway.save_session(&second).await.unwrap_err();
        assert!(matches!(err, ChatGatewayError::Conflict { found: 1, .. }));
        assert_eq!(gateway.find_session_by_id("c1").await.unwrap().revision(), 1);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = JsonFileChatGateway::new(dir.path());
        gateway.create_session(&session("c1", 100)).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["c1.json".to_string()]);
    }
}

//! Chat session aggregate with token-budget FIFO windowing.
//!
//! A [`ChatSession`] owns the ordered *active window* of messages that is
//! sent to the model on the next completion, plus an append-only *evicted
//! history* of messages pushed out to respect the model's token budget.
//!
//! # Windowing
//!
//! ```text
//! add_message(m):
//!   m.tokens > budget            -> Capacity error, nothing changes
//!   while usage + m.tokens > budget:
//!       evicted.push(window.pop_front())
//!   window.push_back(m)
//! ```
//!
//! The initial system message is windowed like any other turn and can be
//! evicted once the conversation grows; a copy is kept in
//! [`ChatSession::initial_system_message`].

use crate::chat::config::ChatConfig;
use crate::chat::message::Message;
use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Lifecycle status of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Active,
    Ended,
}

impl ChatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatStatus::Active => "active",
            ChatStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for ChatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bounded conversation with a model (Aggregate Root)
///
/// Deserialization re-checks the window against the stored usage and the
/// model budget, so a stale or edited record is rejected instead of loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredChatSession")]
pub struct ChatSession {
    id: String,
    owner_id: String,
    initial_system_message: Message,
    active_window: VecDeque<Message>,
    evicted_history: Vec<Message>,
    status: ChatStatus,
    token_usage: usize,
    config: ChatConfig,
    #[serde(default)]
    revision: u64,
}

/// Wire shape of [`ChatSession`] before its invariants are checked.
#[derive(Deserialize)]
struct StoredChatSession {
    id: String,
    owner_id: String,
    initial_system_message: Message,
    active_window: VecDeque<Message>,
    evicted_history: Vec<Message>,
    status: ChatStatus,
    token_usage: usize,
    config: ChatConfig,
    #[serde(default)]
    revision: u64,
}

impl TryFrom<StoredChatSession> for ChatSession {
    type Error = DomainError;

    fn try_from(stored: StoredChatSession) -> Result<Self, Self::Error> {
        if stored.id.trim().is_empty() {
            return Err(DomainError::validation("chat id is empty"));
        }

        let session = Self {
            id: stored.id,
            owner_id: stored.owner_id,
            initial_system_message: stored.initial_system_message,
            active_window: stored.active_window,
            evicted_history: stored.evicted_history,
            status: stored.status,
            token_usage: stored.token_usage,
            config: stored.config,
            revision: stored.revision,
        };
        session.validate()?;

        let window_tokens: usize = session.active_window.iter().map(Message::token_count).sum();
        if window_tokens != session.token_usage {
            return Err(DomainError::state(format!(
                "stored token usage {} does not match window total {}",
                session.token_usage, window_tokens
            )));
        }

        let limit = session.config.model().max_tokens();
        if window_tokens > limit {
            return Err(DomainError::Capacity {
                required: window_tokens,
                limit,
            });
        }

        Ok(session)
    }
}

impl ChatSession {
    /// Create a session with a freshly generated id.
    pub fn new(
        owner_id: impl Into<String>,
        initial_system_message: Message,
        config: ChatConfig,
    ) -> Result<Self, DomainError> {
        Self::with_id(
            Uuid::new_v4().to_string(),
            owner_id,
            initial_system_message,
            config,
        )
    }

    /// Create a session with a caller-chosen id.
    ///
    /// The session is validated first, then the system message is inserted
    /// through the regular windowing policy.
    pub fn with_id(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        initial_system_message: Message,
        config: ChatConfig,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::validation("chat id is empty"));
        }

        let mut session = Self {
            id,
            owner_id: owner_id.into(),
            initial_system_message: initial_system_message.clone(),
            active_window: VecDeque::new(),
            evicted_history: Vec::new(),
            status: ChatStatus::Active,
            token_usage: 0,
            config,
            revision: 0,
        };

        session.validate()?;
        session.add_message(initial_system_message)?;

        Ok(session)
    }

    /// Append a message, evicting the oldest turns until it fits.
    ///
    /// Returns the number of messages moved to the evicted history.
    ///
    /// # Errors
    /// - [`DomainError::State`] if the session has ended
    /// - [`DomainError::Capacity`] if the message alone exceeds the budget;
    ///   the session is left untouched in that case
    pub fn add_message(&mut self, message: Message) -> Result<usize, DomainError> {
        if self.status == ChatStatus::Ended {
            return Err(DomainError::state(
                "chat is ended. No more messages are allowed",
            ));
        }

        let limit = self.config.model().max_tokens();
        let required = message.token_count();
        if required > limit {
            return Err(DomainError::Capacity { required, limit });
        }

        let mut evicted = 0;
        while self.token_usage + required > limit {
            let Some(oldest) = self.active_window.pop_front() else {
                // usage is zero with an empty window, so this only happens
                // if token_usage was corrupted
                return Err(DomainError::Capacity { required, limit });
            };
            self.evicted_history.push(oldest);
            self.refresh_token_usage();
            evicted += 1;
        }

        self.active_window.push_back(message);
        self.refresh_token_usage();

        Ok(evicted)
    }

    /// Transition Active -> Ended.
    ///
    /// Ending an already ended session is a [`DomainError::State`].
    pub fn end(&mut self) -> Result<(), DomainError> {
        if self.status == ChatStatus::Ended {
            return Err(DomainError::state("chat is already ended"));
        }
        self.status = ChatStatus::Ended;
        Ok(())
    }

    /// Recompute `token_usage` from the active window.
    pub fn refresh_token_usage(&mut self) {
        self.token_usage = self.active_window.iter().map(Message::token_count).sum();
    }

    /// Validate owner and configuration bounds.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut issues = Vec::new();
        if self.owner_id.trim().is_empty() {
            issues.push("user id is empty".to_string());
        }
        issues.extend(self.config.validate());

        if issues.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(issues.join("; ")))
        }
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn initial_system_message(&self) -> &Message {
        &self.initial_system_message
    }

    /// Messages that will be sent with the next request, oldest first.
    pub fn active_window(&self) -> impl ExactSizeIterator<Item = &Message> {
        self.active_window.iter()
    }

    pub fn evicted_history(&self) -> &[Message] {
        &self.evicted_history
    }

    pub fn status(&self) -> ChatStatus {
        self.status
    }

    pub fn is_ended(&self) -> bool {
        self.status == ChatStatus::Ended
    }

    pub fn token_usage(&self) -> usize {
        self.token_usage
    }

    /// Tokens still available before the next insertion triggers eviction.
    pub fn remaining_tokens(&self) -> usize {
        self.config
            .model()
            .max_tokens()
            .saturating_sub(self.token_usage)
    }

    pub fn message_count(&self) -> usize {
        self.active_window.len()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        self.config.model()
    }

    /// Persistence revision, managed by gateways for optimistic concurrency.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }
}

//! Message value object and conversation roles

use crate::chat::token_counter::TokenCounter;
use crate::core::error::DomainError;
use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::validation(format!("invalid role: {other}"))),
        }
    }
}

/// One turn of a conversation (Value Object)
///
/// The token count is computed once, against the model active when the
/// message was created, and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    token_count: usize,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message, counting its tokens with `counter`.
    ///
    /// Fails with [`DomainError::Validation`] when the content is empty or
    /// the counter cannot measure it.
    pub fn new(
        role: Role,
        content: impl Into<String>,
        model: &Model,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        let content = content.into();
        if content.is_empty() {
            return Err(DomainError::validation("content is empty"));
        }

        let token_count = counter
            .count(model.identifier(), &content)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            token_count,
            created_at: Utc::now(),
        })
    }

    pub fn system(
        content: impl Into<String>,
        model: &Model,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::System, content, model, counter)
    }

    pub fn user(
        content: impl Into<String>,
        model: &Model,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::User, content, model, counter)
    }

    pub fn assistant(
        content: impl Into<String>,
        model: &Model,
        counter: &dyn TokenCounter,
    ) -> Result<Self, DomainError> {
        Self::new(Role::Assistant, content, model, counter)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::chat::token_counter::TokenCountError;

    /// Counts whitespace-separated words; "fail" as model name errors out.
    pub struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, model_identifier: &str, text: &str) -> Result<usize, TokenCountError> {
            if model_identifier == "fail" {
                return Err(TokenCountError::new(model_identifier, "unsupported model"));
            }
            Ok(text.split_whitespace().count())
        }
    }

    /// Build a message whose token count is exactly `tokens`.
    pub fn message_with_tokens(role: Role, tokens: usize, model: &Model) -> Message {
        let content = if tokens == 0 {
            " ".to_string()
        } else {
            vec!["tok"; tokens].join(" ")
        };
        Message::new(role, content, model, &WordCounter).unwrap()
    }
}

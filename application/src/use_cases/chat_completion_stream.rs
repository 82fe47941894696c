//! Chat Completion Stream use case.
//!
//! Drives one streamed completion against a bounded chat session:
//!
//! ```text
//! Lookup ─┬─ Found ────────┐
//!         └─ NotFound ─ Create
//!                          │
//!              AppendUser ─┴─ BuildRequest ─ StreamReceive (loop)
//!                                                 │
//!                          AppendAssistant ─ Persist ─ Done
//! ```
//!
//! Every received delta produces one [`ChatCompletionOutput`] carrying the
//! accumulated text so far, sent on a per-request channel. The session is
//! persisted once, at the very end; a run that fails or is cancelled
//! before that point leaves the stored session untouched.

use crate::ports::chat_gateway::{ChatGateway, ChatGatewayError};
use crate::ports::completion_client::{
    CompletionClient, CompletionRequest, RequestMessage, StreamError, UpstreamError,
};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use chatstream_domain::{
    ChatConfig, ChatSession, DomainError, Message, Model, Role, TokenCounter,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Failure while building or storing a brand-new chat.
#[derive(Error, Debug)]
pub enum CreateChatError {
    #[error("invalid chat: {0}")]
    Invalid(#[from] DomainError),

    #[error("error persisting new chat: {0}")]
    Persist(#[source] ChatGatewayError),
}

/// Errors that can occur during a streamed chat completion.
#[derive(Error, Debug)]
pub enum ChatCompletionError {
    #[error("error fetching existing chat: {0}")]
    Lookup(#[source] ChatGatewayError),

    #[error("error creating new chat: {0}")]
    Creation(#[from] CreateChatError),

    #[error("error {operation}: {source}")]
    Message {
        operation: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("error creating chat completion: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("error streaming response: {0}")]
    Stream(#[from] StreamError),

    #[error("error saving chat: {0}")]
    Persistence(#[source] ChatGatewayError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ChatCompletionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ChatCompletionError::Cancelled)
    }
}

/// Configuration used when the requested chat does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletionConfigInput {
    pub model: String,
    pub model_max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    pub stop: Vec<String>,
    /// Output cap per response, `0` for the provider default.
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub initial_system_message: String,
}

impl ChatCompletionConfigInput {
    pub fn new(
        model: impl Into<String>,
        model_max_tokens: usize,
        initial_system_message: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            model_max_tokens,
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: Vec::new(),
            max_tokens: 0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            initial_system_message: initial_system_message.into(),
        }
    }
}

/// Input for the [`ChatCompletionStreamUseCase`].
#[derive(Debug, Clone)]
pub struct ChatCompletionInput {
    /// Chat to continue. Empty to always start a new chat.
    pub chat_id: String,
    pub user_id: String,
    pub user_message: String,
    pub config: ChatCompletionConfigInput,
}

impl ChatCompletionInput {
    pub fn new(
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
        user_message: impl Into<String>,
        config: ChatCompletionConfigInput,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id: user_id.into(),
            user_message: user_message.into(),
            config,
        }
    }
}

/// One output event: the assistant text accumulated so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionOutput {
    pub chat_id: String,
    pub user_id: String,
    pub content: String,
}

/// Use case for running one streamed completion on a chat session.
#[derive(Clone)]
pub struct ChatCompletionStreamUseCase {
    gateway: Arc<dyn ChatGateway>,
    client: Arc<dyn CompletionClient>,
    token_counter: Arc<dyn TokenCounter>,
    conversation_logger: Arc<dyn ConversationLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl ChatCompletionStreamUseCase {
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        client: Arc<dyn CompletionClient>,
        token_counter: Arc<dyn TokenCounter>,
    ) -> Self {
        Self {
            gateway,
            client,
            token_counter,
            conversation_logger: Arc::new(NoConversationLogger),
            cancellation_token: None,
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Run the pipeline, sending one event per delta on `output`.
    ///
    /// `send` on `output` is awaited, so a bounded channel applies
    /// backpressure to the stream. If the receiver is dropped, emission stops
    /// and the run still completes and persists.
    pub async fn execute(
        &self,
        input: ChatCompletionInput,
        output: &mpsc::Sender<ChatCompletionOutput>,
    ) -> Result<ChatCompletionOutput, ChatCompletionError> {
        self.check_cancelled()?;
        info!("Starting chat completion for chat '{}'", input.chat_id);

        let mut chat = self.load_or_create(&input).await?;
        let model = chat.model().clone();

        // ==================== Append User ====================
        let user_message = Message::user(
            input.user_message.as_str(),
            &model,
            self.token_counter.as_ref(),
        )
        .map_err(|source| ChatCompletionError::Message {
            operation: "creating user message",
            source,
        })?;
        let user_tokens = user_message.token_count();
        let evicted = chat
            .add_message(user_message)
            .map_err(|source| ChatCompletionError::Message {
                operation: "adding user message",
                source,
            })?;
        self.log_turn(&chat, Role::User, &input.user_message, user_tokens, evicted);

        // ==================== Build Request ====================
        let request = build_request(&chat);
        debug!(
            "Chat {}: requesting {} with {} messages ({} tokens)",
            chat.id(),
            request.model,
            request.messages.len(),
            chat.token_usage()
        );

        let mut stream = self.cancellable(self.client.open(request)).await??;

        // ==================== Stream Receive ====================
        let mut full_response = String::new();
        let mut consumer_gone = false;

        while let Some(delta) = self.cancellable(stream.receive()).await?? {
            full_response.push_str(&delta);

            if consumer_gone {
                continue;
            }
            let event = ChatCompletionOutput {
                chat_id: chat.id().to_string(),
                user_id: input.user_id.clone(),
                content: full_response.clone(),
            };
            if self.cancellable(output.send(event)).await?.is_err() {
                warn!(
                    "Output receiver for chat {} dropped; finishing without emitting",
                    chat.id()
                );
                consumer_gone = true;
            }
        }

        // ==================== Append Assistant ====================
        let assistant_message = Message::assistant(
            full_response.as_str(),
            &model,
            self.token_counter.as_ref(),
        )
        .map_err(|source| ChatCompletionError::Message {
            operation: "creating assistant message",
            source,
        })?;
        let assistant_tokens = assistant_message.token_count();
        let evicted = chat
            .add_message(assistant_message)
            .map_err(|source| ChatCompletionError::Message {
                operation: "adding assistant message",
                source,
            })?;
        self.log_turn(
            &chat,
            Role::Assistant,
            &full_response,
            assistant_tokens,
            evicted,
        );

        // ==================== Persist ====================
        // Last chance to abort; the save itself is never interrupted.
        self.check_cancelled()?;
        self.gateway
            .save_session(&chat)
            .await
            .map_err(ChatCompletionError::Persistence)?;

        info!(
            "Chat {} saved: {} active messages, {} tokens in use",
            chat.id(),
            chat.message_count(),
            chat.token_usage()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "chat_saved",
            chat.id(),
            serde_json::json!({
                "active_messages": chat.message_count(),
                "evicted_messages": chat.evicted_history().len(),
                "token_usage": chat.token_usage(),
            }),
        ));

        Ok(ChatCompletionOutput {
            chat_id: chat.id().to_string(),
            user_id: input.user_id,
            content: full_response,
        })
    }

    async fn load_or_create(
        &self,
        input: &ChatCompletionInput,
    ) -> Result<ChatSession, ChatCompletionError> {
        if !input.chat_id.is_empty() {
            match self
                .cancellable(self.gateway.find_session_by_id(&input.chat_id))
                .await?
            {
                Ok(chat) => {
                    debug!(
                        "Loaded chat {} ({} active, {} evicted)",
                        chat.id(),
                        chat.message_count(),
                        chat.evicted_history().len()
                    );
                    return Ok(chat);
                }
                Err(e) if e.is_not_found() => {
                    debug!("Chat {} not found, creating it", input.chat_id);
                }
                Err(e) => return Err(ChatCompletionError::Lookup(e)),
            }
        }

        let chat = create_new_chat(input, self.token_counter.as_ref())
            .map_err(CreateChatError::Invalid)?;
        self.cancellable(self.gateway.create_session(&chat))
            .await?
            .map_err(CreateChatError::Persist)?;

        info!("Created chat {} for user {}", chat.id(), chat.owner_id());
        self.conversation_logger.log(ConversationEvent::new(
            "chat_created",
            chat.id(),
            serde_json::json!({
                "owner_id": chat.owner_id(),
                "model": chat.model().identifier(),
                "max_tokens": chat.model().max_tokens(),
                "system_message": chat.initial_system_message().content(),
            }),
        ));

        Ok(chat)
    }

    fn log_turn(
        &self,
        chat: &ChatSession,
        role: Role,
        content: &str,
        tokens: usize,
        evicted: usize,
    ) {
        if evicted > 0 {
            debug!(
                "Chat {}: evicted {} message(s) to fit a {} turn",
                chat.id(),
                evicted,
                role
            );
            self.conversation_logger.log(ConversationEvent::new(
                "messages_evicted",
                chat.id(),
                serde_json::json!({
                    "count": evicted,
                    "evicted_total": chat.evicted_history().len(),
                }),
            ));
        }

        let event_type = match role {
            Role::System => "system_message",
            Role::User => "user_message",
            Role::Assistant => "assistant_message",
        };
        self.conversation_logger.log(ConversationEvent::new(
            event_type,
            chat.id(),
            serde_json::json!({
                "tokens": tokens,
                "token_usage": chat.token_usage(),
                "text": content,
            }),
        ));
    }

    /// Race `future` against the cancellation token, if any.
    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output, ChatCompletionError> {
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ChatCompletionError::Cancelled),
                output = future => Ok(output),
            },
            None => Ok(future.await),
        }
    }

    fn check_cancelled(&self) -> Result<(), ChatCompletionError> {
        if let Some(token) = &self.cancellation_token
            && token.is_cancelled()
        {
            return Err(ChatCompletionError::Cancelled);
        }
        Ok(())
    }
}

/// Build a new chat from the input's configuration.
///
/// The chat takes the requested id, or a generated one when the id is empty.
/// The system message is already windowed when this returns.
pub fn create_new_chat(
    input: &ChatCompletionInput,
    counter: &dyn TokenCounter,
) -> Result<ChatSession, DomainError> {
    let cfg = &input.config;
    let model = Model::new(cfg.model.as_str(), cfg.model_max_tokens)?;

    let config = ChatConfig::new(model.clone())
        .with_temperature(cfg.temperature)
        .with_top_p(cfg.top_p)
        .with_n(cfg.n)
        .with_stop(cfg.stop.clone())
        .with_max_output_tokens(cfg.max_tokens)
        .with_presence_penalty(cfg.presence_penalty)
        .with_frequency_penalty(cfg.frequency_penalty);

    let initial_message = Message::system(cfg.initial_system_message.as_str(), &model, counter)?;

    if input.chat_id.is_empty() {
        ChatSession::new(input.user_id.as_str(), initial_message, config)
    } else {
        ChatSession::with_id(
            input.chat_id.as_str(),
            input.user_id.as_str(),
            initial_message,
            config,
        )
    }
}

/// Project the active window and sampling settings into a streamed request.
pub fn build_request(chat: &ChatSession) -> CompletionRequest {
    let config = chat.config();
    CompletionRequest {
        model: chat.model().identifier().to_string(),
        messages: chat
            .active_window()
            .map(|m| RequestMessage {
                role: m.role(),
                content: m.content().to_string(),
            })
            .collect(),
        temperature: config.temperature(),
        top_p: config.top_p(),
        n: config.n(),
        stop: config.stop().to_vec(),
        max_tokens: match config.max_output_tokens() {
            0 => None,
            cap => Some(cap),
        },
        presence_penalty: config.presence_penalty(),
        frequency_penalty: config.frequency_penalty(),
        stream: true,
    }
}

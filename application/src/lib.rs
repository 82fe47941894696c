//! Application layer for chatstream
//!
//! This crate contains the completion use case and the port definitions
//! its adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    chat_gateway::{ChatGateway, ChatGatewayError},
    completion_client::{
        CompletionClient, CompletionRequest, RequestMessage, StreamError, StreamHandle,
        UpstreamError,
    },
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
};
pub use use_cases::chat_completion_stream::{
    ChatCompletionConfigInput, ChatCompletionError, ChatCompletionInput, ChatCompletionOutput,
    ChatCompletionStreamUseCase, CreateChatError, build_request, create_new_chat,
};

//! Domain layer for chatstream
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Chat Session
//!
//! A [`ChatSession`] is a conversation bounded by its model's token budget:
//!
//! - **Active window**: messages sent with the next completion request
//! - **Evicted history**: older messages pushed out, oldest first, to make room
//!
//! ## Message
//!
//! A [`Message`] is immutable. Its token count is measured once through a
//! [`TokenCounter`] and never recomputed.

pub mod chat;
pub mod core;

// Re-export commonly used types
pub use chat::{
    config::ChatConfig,
    message::{Message, Role},
    session::{ChatSession, ChatStatus},
    stream::StreamEvent,
    token_counter::{TokenCountError, TokenCounter},
};
pub use core::{error::DomainError, model::Model};

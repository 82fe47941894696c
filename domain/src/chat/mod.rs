//! Chat domain.
//!
//! - [`session::ChatSession`]: the conversation aggregate with token-budget windowing
//! - [`message::Message`]: a single turn with a frozen token count
//! - [`config::ChatConfig`]: model plus sampling parameters
//! - [`token_counter::TokenCounter`]: trait for measuring text in tokens
//! - [`stream::StreamEvent`]: incremental upstream output

pub mod config;
pub mod message;
pub mod session;
pub mod stream;
pub mod token_counter;

//! OpenAI-compatible completion upstream.
//!
//! Works against any server that speaks the `/chat/completions` streaming
//! protocol (OpenAI, Azure-style proxies, local inference servers).

mod client;
mod sse;
mod types;

pub use client::OpenAiCompletionClient;
pub use sse::{DONE_SENTINEL, SseBuffer, parse_data_lines};

//! Chat session storage adapters.
//!
//! Both implement the [`ChatGateway`](chatstream_application::ChatGateway)
//! port with an optimistic revision check on save.

mod json_file;
mod memory;

pub use json_file::JsonFileChatGateway;
pub use memory::InMemoryChatGateway;

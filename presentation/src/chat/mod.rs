//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface and the streamed
//! turn runner shared with single-message mode.

mod repl;
mod turn;

pub use repl::ChatRepl;
pub use turn::run_turn;

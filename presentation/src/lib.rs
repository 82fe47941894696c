//! Presentation layer for chatstream
//!
//! This crate contains CLI definitions, console output for streamed
//! replies, and the interactive chat interface.

pub mod chat;
pub mod cli;
pub mod output;

// Re-export commonly used types
pub use chat::{ChatRepl, run_turn};
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::{ConsoleFormatter, StreamPrinter};

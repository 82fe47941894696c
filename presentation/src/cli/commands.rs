//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// How a finished reply is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Stream text to the terminal as it arrives
    Text,
    /// Print the final reply as one JSON object
    Json,
}

/// CLI arguments for chatstream
#[derive(Parser, Debug)]
#[command(name = "chatstream")]
#[command(author, version, about = "Streaming LLM chat with a token-bounded history window")]
#[command(long_about = r#"
chatstream sends your message to an OpenAI-compatible model and streams the
reply as it is generated. Each chat keeps its most recent messages within the
model's token budget; older turns are moved to an archive instead of being sent.

Configuration files are loaded from (in priority order):
1. CHATSTREAM_* environment variables (e.g. CHATSTREAM_MODEL__NAME)
2. --config <path>        Explicit config file
3. ./chatstream.toml      Project-level config
4. ~/.config/chatstream/config.toml   Global config

Example:
  chatstream "Explain ownership in one paragraph"
  chatstream --session rust-notes "And borrowing?"
  chatstream --chat -m gpt-4o
  chatstream --offline --chat
"#)]
pub struct Cli {
    /// The message to send (not required in chat mode)
    pub message: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Chat id to continue (created if it does not exist)
    #[arg(short, long, value_name = "ID")]
    pub session: Option<String>,

    /// User id recorded as the owner of new chats
    #[arg(short, long, value_name = "ID")]
    pub user: Option<String>,

    /// Model for new chats
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Token budget for new chats
    #[arg(long, value_name = "TOKENS")]
    pub max_tokens: Option<usize>,

    /// System message for new chats
    #[arg(long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Answer with a local echo instead of calling the upstream
    #[arg(long)]
    pub offline: bool,

    /// Keep chats in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress headers and usage lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_message_with_session() {
        let cli = Cli::parse_from(["chatstream", "--session", "notes", "-vv", "hello"]);
        assert_eq!(cli.message.as_deref(), Some("hello"));
        assert_eq!(cli.session.as_deref(), Some("notes"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Text);
        assert!(!cli.chat);
    }

    #[test]
    fn test_chat_mode_overrides() {
        let cli = Cli::parse_from([
            "chatstream",
            "--chat",
            "-m",
            "gpt-4o",
            "--max-tokens",
            "2048",
            "--offline",
            "-o",
            "json",
        ]);
        assert!(cli.chat);
        assert!(cli.offline);
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.max_tokens, Some(2048));
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.message.is_none());
    }
}

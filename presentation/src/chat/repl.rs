//! REPL (Read-Eval-Print Loop) for interactive chat

use super::turn::run_turn;
use crate::output::console::ConsoleFormatter;
use chatstream_application::{
    ChatCompletionConfigInput, ChatCompletionInput, ChatCompletionStreamUseCase, ChatGateway,
};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;

/// What a slash command asks the loop to do
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Help,
    New,
    Info,
    Window,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        match line {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/new" => Command::New,
            "/info" => Command::Info,
            "/window" | "/w" => Command::Window,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: ChatCompletionStreamUseCase,
    gateway: Arc<dyn ChatGateway>,
    config: ChatCompletionConfigInput,
    user_id: String,
    chat_id: String,
    history_path: Option<PathBuf>,
    show_usage: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(
        use_case: ChatCompletionStreamUseCase,
        gateway: Arc<dyn ChatGateway>,
        config: ChatCompletionConfigInput,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            use_case,
            gateway,
            config,
            user_id: user_id.into(),
            chat_id: String::new(),
            history_path: None,
            show_usage: true,
        }
    }

    /// Continue an existing chat instead of starting a new one
    pub fn with_chat_id(mut self, chat_id: impl Into<String>) -> Self {
        self.chat_id = chat_id.into();
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    /// Set whether to print token usage after each reply
    pub fn with_usage(mut self, show: bool) -> Self {
        self.show_usage = show;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(">>> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(Command::parse(line)).await {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("{}", ConsoleFormatter::error(format!("{err:?}")));
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "chatstream - interactive chat".bold());
        println!("Model: {} ({} tokens)", self.config.model, self.config.model_max_tokens);
        if !self.chat_id.is_empty() {
            println!("Chat:  {}", self.chat_id);
        }
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /new              - Start a new chat");
        println!("  /info             - Show the current chat's token usage");
        println!("  /window, /w       - Show the messages sent with the next turn");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => {
                println!("Bye!");
                return true;
            }
            Command::Help => Self::print_help(),
            Command::New => {
                self.chat_id.clear();
                println!("Started a new chat.");
            }
            Command::Info => self.show_chat(false).await,
            Command::Window => self.show_chat(true).await,
            Command::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn show_chat(&self, window: bool) {
        if self.chat_id.is_empty() {
            println!("No messages yet.");
            return;
        }
        match self.gateway.find_session_by_id(&self.chat_id).await {
            Ok(chat) if window => print!("{}", ConsoleFormatter::window(&chat)),
            Ok(chat) => println!("{}", ConsoleFormatter::usage_line(&chat)),
            Err(e) => eprintln!("{}", ConsoleFormatter::error(e)),
        }
    }

    async fn process_message(&mut self, message: &str) {
        let input = ChatCompletionInput::new(
            self.chat_id.clone(),
            self.user_id.clone(),
            message,
            self.config.clone(),
        );

        match run_turn(&self.use_case, input, true).await {
            Ok(output) => {
                // a fresh chat gets its id on the first turn
                self.chat_id = output.chat_id;
                if self.show_usage
                    && let Ok(chat) = self.gateway.find_session_by_id(&self.chat_id).await
                {
                    println!("{}", ConsoleFormatter::usage_line(&chat));
                }
            }
            Err(e) if e.is_cancelled() => println!("{}", "(cancelled)".dimmed()),
            Err(e) => eprintln!("{}", ConsoleFormatter::error(e)),
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("/q"), Command::Quit);
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(Command::parse("/?"), Command::Help);
        assert_eq!(Command::parse("/new"), Command::New);
        assert_eq!(Command::parse("/w"), Command::Window);
        assert_eq!(
            Command::parse("/nope"),
            Command::Unknown("/nope".to_string())
        );
    }
}

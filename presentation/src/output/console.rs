//! Console output for streamed replies

use chatstream_application::ChatCompletionOutput;
use chatstream_domain::{ChatSession, Role};
use colored::Colorize;
use std::io::{self, Stdout, Write};

/// Prints a reply incrementally.
///
/// Each output event carries the whole reply so far; only the part not yet
/// printed is written.
pub struct StreamPrinter<W: Write = Stdout> {
    writer: W,
    printed: usize,
}

impl StreamPrinter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StreamPrinter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, printed: 0 }
    }

    /// Write the new suffix of `event.content` and flush.
    pub fn print(&mut self, event: &ChatCompletionOutput) -> io::Result<()> {
        let suffix = event.content.get(self.printed..).unwrap_or_default();
        if suffix.is_empty() {
            return Ok(());
        }
        self.writer.write_all(suffix.as_bytes())?;
        self.writer.flush()?;
        self.printed = event.content.len();
        Ok(())
    }

    /// End the reply with a newline, if anything was printed.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.printed > 0 {
            writeln!(self.writer)?;
            self.writer.flush()?;
        }
        self.printed = 0;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats chat state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One-line summary of a chat's window.
    pub fn usage_line(chat: &ChatSession) -> String {
        let mut line = format!(
            "[{} | {}/{} tokens | {} active",
            chat.id(),
            chat.token_usage(),
            chat.model().max_tokens(),
            chat.message_count()
        );
        if !chat.evicted_history().is_empty() {
            line.push_str(&format!(", {} archived", chat.evicted_history().len()));
        }
        line.push(']');
        line.dimmed().to_string()
    }

    /// The active window, oldest first.
    pub fn window(chat: &ChatSession) -> String {
        let mut output = String::new();
        for message in chat.active_window() {
            let label = format!("{:>9}", message.role().as_str());
            let label = match message.role() {
                Role::System => label.magenta(),
                Role::User => label.cyan(),
                Role::Assistant => label.green(),
            };
            output.push_str(&format!(
                "{} {} {}\n",
                label.bold(),
                format!("({:>4})", message.token_count()).dimmed(),
                Self::preview(message.content(), 72)
            ));
        }
        output
    }

    pub fn format_json(output: &ChatCompletionOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    pub fn error(message: impl std::fmt::Display) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    fn preview(text: &str, max_chars: usize) -> String {
        let single_line = text.replace('\n', " ");
        if single_line.chars().count() <= max_chars {
            return single_line;
        }
        let cut: String = single_line.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(content: &str) -> ChatCompletionOutput {
        ChatCompletionOutput {
            chat_id: "c1".to_string(),
            user_id: "u1".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_prints_only_new_suffix() {
        let mut printer = StreamPrinter::new(Vec::new());
        for content in ["Hel", "Hello ", "Hello world"] {
            printer.print(&event(content)).unwrap();
        }
        printer.finish().unwrap();
        assert_eq!(printer.into_inner(), b"Hello world\n");
    }

    #[test]
    fn test_finish_resets_for_next_reply() {
        let mut printer = StreamPrinter::new(Vec::new());
        printer.print(&event("one")).unwrap();
        printer.finish().unwrap();
        printer.print(&event("two")).unwrap();
        printer.finish().unwrap();
        assert_eq!(printer.into_inner(), b"one\ntwo\n");
    }

    #[test]
    fn test_finish_without_output_prints_nothing() {
        let mut printer = StreamPrinter::new(Vec::new());
        printer.finish().unwrap();
        assert!(printer.into_inner().is_empty());
    }

    #[test]
    fn test_multibyte_suffix() {
        let mut printer = StreamPrinter::new(Vec::new());
        printer.print(&event("こん")).unwrap();
        printer.print(&event("こんにちは")).unwrap();
        assert_eq!(
            String::from_utf8(printer.into_inner()).unwrap(),
            "こんにちは"
        );
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(ConsoleFormatter::preview("short", 10), "short");
        assert_eq!(ConsoleFormatter::preview("line\nbreak", 20), "line break");
        assert_eq!(ConsoleFormatter::preview("ééééé", 3), "ééé...");
    }

    #[test]
    fn test_format_json_round_trips() {
        let json = ConsoleFormatter::format_json(&event("hi"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["chat_id"], "c1");
        assert_eq!(value["content"], "hi");
    }
}

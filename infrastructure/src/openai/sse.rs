//! Server-sent event framing.

/// Sentinel data payload that ends an OpenAI-style stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Accumulates raw body bytes and hands out complete event blocks.
///
/// Blocks are separated by a blank line. Bytes are kept undecoded until a
/// block is complete, so multi-byte characters split across network chunks
/// survive. Carriage returns are dropped on input.
#[derive(Debug, Default)]
pub struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.buffer
            .extend(chunk.iter().copied().filter(|b| *b != b'\r'));
    }

    /// Take the next complete block, without its trailing blank line.
    pub fn next_event_block(&mut self) -> Option<String> {
        let boundary = self.buffer.windows(2).position(|w| w == b"\n\n")?;
        let rest = self.buffer.split_off(boundary + 2);
        let mut block = std::mem::replace(&mut self.buffer, rest);
        block.truncate(boundary);
        Some(String::from_utf8_lossy(&block).into_owned())
    }

    /// Whatever is left once the body ended without a final blank line.
    pub fn take_remainder(&mut self) -> Option<String> {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return None;
        }
        let block = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&block).into_owned())
    }
}

/// The `data:` payloads of one event block, in order.
pub fn parse_data_lines(event_block: &str) -> Vec<&str> {
    event_block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_event_block_returns_complete_frames_only() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"data: first\n\npartial");

        assert_eq!(buffer.next_event_block().as_deref(), Some("data: first"));
        assert!(buffer.next_event_block().is_none());

        buffer.push_chunk(b"ly\n\n");
        assert_eq!(buffer.next_event_block().as_deref(), Some("partially"));
    }

    #[test]
    fn crlf_framing_is_normalized() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"data: one\r\n\r");
        buffer.push_chunk(b"\ndata: two\r\n\r\n");

        assert_eq!(buffer.next_event_block().as_deref(), Some("data: one"));
        assert_eq!(buffer.next_event_block().as_deref(), Some("data: two"));
    }

    #[test]
    fn split_multibyte_char_is_preserved() {
        let bytes = "data: é\n\n".as_bytes();
        let split = bytes.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut buffer = SseBuffer::new();
        buffer.push_chunk(&bytes[..split]);
        assert!(buffer.next_event_block().is_none());
        buffer.push_chunk(&bytes[split..]);
        assert_eq!(buffer.next_event_block().as_deref(), Some("data: é"));
    }

    #[test]
    fn parse_data_lines_extracts_data_prefix_lines() {
        let block = "event: message\ndata: one\nfoo: ignored\ndata:two";
        assert_eq!(parse_data_lines(block), vec!["one", "two"]);
    }

    #[test]
    fn remainder_ignores_trailing_whitespace() {
        let mut buffer = SseBuffer::new();
        buffer.push_chunk(b"\n");
        assert!(buffer.take_remainder().is_none());

        buffer.push_chunk(b"data: tail");
        assert_eq!(buffer.take_remainder().as_deref(), Some("data: tail"));
    }
}

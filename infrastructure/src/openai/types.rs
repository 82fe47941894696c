//! OpenAI chat completions wire types.

use chatstream_application::ports::completion_client::{CompletionRequest, RequestMessage};
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [RequestMessage],
    pub temperature: f32,
    pub top_p: f32,
    pub n: u32,
    #[serde(skip_serializing_if = "no_stop_sequences")]
    pub stop: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub stream: bool,
}

fn no_stop_sequences(stop: &&[String]) -> bool {
    stop.is_empty()
}

impl<'a> From<&'a CompletionRequest> for ChatCompletionBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            top_p: request.top_p,
            n: request.n,
            stop: &request.stop,
            max_tokens: request.max_tokens,
            presence_penalty: request.presence_penalty,
            frequency_penalty: request.frequency_penalty,
            stream: request.stream,
        }
    }
}

/// One streamed `chat.completion.chunk`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: String,
}

impl ChatCompletionChunk {
    /// Text of the first choice, if this chunk carries any.
    pub fn first_choice_text(&self) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.index == 0)
            .and_then(|c| c.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatstream_domain::Role;

    #[test]
    fn body_omits_empty_stop_and_default_cap() {
        let request = CompletionRequest {
            model: "gpt-test".to_string(),
            messages: vec![RequestMessage {
                role: Role::User,
                content: "hi".to_string(),
            }],
            temperature: 1.0,
            top_p: 1.0,
            n: 1,
            stop: vec![],
            max_tokens: None,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            stream: true,
        };

        let value = serde_json::to_value(ChatCompletionBody::from(&request)).unwrap();
        assert!(value.get("stop").is_none());
        assert!(value.get("max_tokens").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["stream"], true);
    }

    #[test]
    fn chunk_text_uses_first_choice() {
        let chunk: ChatCompletionChunk = serde_json::from_str(
            r#"{"choices":[{"index":1,"delta":{"content":"other"}},{"index":0,"delta":{"content":"mine"}}]}"#,
        )
        .unwrap();
        assert_eq!(chunk.first_choice_text(), Some("mine"));
    }

    #[test]
    fn role_only_chunk_has_no_text() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"index":0,"delta":{"role":"assistant"}}]}"#)
                .unwrap();
        assert_eq!(chunk.first_choice_text(), None);
    }
}

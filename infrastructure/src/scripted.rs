//! Offline completion client.

use async_trait::async_trait;
use chatstream_application::ports::completion_client::{
    CompletionClient, CompletionRequest, StreamHandle, UpstreamError,
};
use chatstream_domain::{Role, StreamEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
enum Script {
    Fixed(Vec<String>),
    Echo,
}

/// Completion client that never touches the network.
///
/// Either replays a fixed list of deltas on every call, or echoes the last
/// user message back one word at a time.
#[derive(Debug)]
pub struct ScriptedCompletionClient {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedCompletionClient {
    pub fn new(deltas: Vec<String>) -> Self {
        Self {
            script: Script::Fixed(deltas),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn echo() -> Self {
        Self {
            script: Script::Echo,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of streams opened so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn deltas_for(&self, request: &CompletionRequest) -> Vec<String> {
        match &self.script {
            Script::Fixed(deltas) => deltas.clone(),
            Script::Echo => {
                let last_user = request
                    .messages
                    .iter()
                    .rev()
                    .find(|m| m.role == Role::User)
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                let mut deltas = vec!["You said: ".to_string()];
                deltas.extend(last_user.split_inclusive(' ').map(str::to_string));
                deltas
            }
        }
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn open(&self, request: CompletionRequest) -> Result<StreamHandle, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let deltas = self.deltas_for(&request);
        let (tx, rx) = mpsc::channel(deltas.len() + 1);
        for delta in deltas {
            // capacity covers every event, so this never blocks
            let _ = tx.try_send(StreamEvent::Delta(delta));
        }
        let _ = tx.try_send(StreamEvent::Completed);
        Ok(StreamHandle::new(rx))
    }
}

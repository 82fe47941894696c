//! One streamed turn, wired to the terminal.

use crate::output::console::StreamPrinter;
use chatstream_application::{
    ChatCompletionError, ChatCompletionInput, ChatCompletionOutput, ChatCompletionStreamUseCase,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Run one completion, printing deltas as they arrive when `echo` is set.
///
/// Ctrl-C during the turn cancels it; the chat is then left as it was
/// before the turn.
pub async fn run_turn(
    use_case: &ChatCompletionStreamUseCase,
    input: ChatCompletionInput,
    echo: bool,
) -> Result<ChatCompletionOutput, ChatCompletionError> {
    let token = CancellationToken::new();
    let use_case = use_case.clone().with_cancellation(token.clone());

    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        })
    };

    let (tx, mut rx) = mpsc::channel::<ChatCompletionOutput>(1);
    let printer = tokio::spawn(async move {
        let mut printer = StreamPrinter::stdout();
        while let Some(event) = rx.recv().await {
            if echo && let Err(e) = printer.print(&event) {
                warn!("Could not write to stdout: {}", e);
            }
        }
        let _ = printer.finish();
    });

    let result = use_case.execute(input, &tx).await;
    drop(tx);
    let _ = printer.await;
    interrupt.abort();

    result
}

//! Wiring: tailer lines → matcher → one spawned dispatch per event.
//!
//! Dispatch is fire-and-forget. The tailer's callback returns as soon as the
//! tasks are spawned, so its forward progress never depends on a completion
//! or console round trip; events from one read cycle are spawned in file
//! order, and slow dispatches simply overlap.

use std::path::PathBuf;
use std::sync::Arc;

use herald_chat::LineMatcher;
use herald_log_tail::{LogTailer, OnLinesFn, TailError};
use tokio_util::sync::CancellationToken;

use crate::dispatcher::Dispatcher;

/// Builds the tailer callback: match each line, spawn a dispatch per event.
fn on_lines(matcher: LineMatcher, dispatcher: Arc<Dispatcher>) -> OnLinesFn {
    Box::new(move |lines| {
        for line in lines {
            if let Some(event) = matcher.matches(&line) {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move { dispatcher.handle(event).await });
            }
        }
    })
}

/// Spawns the tail-match-dispatch pipeline on the given log file.
///
/// The returned handle resolves when the tailer stops: `Ok` on cancellation,
/// `Err` only for startup failures (missing log file).
pub fn spawn(
    log_file: PathBuf,
    matcher: LineMatcher,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<Result<(), TailError>> {
    let tailer = LogTailer::new(log_file, on_lines(matcher, dispatcher));
    tokio::spawn(tailer.run(cancel))
}

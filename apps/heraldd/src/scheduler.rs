//! Periodic promotional broadcast, independent of log activity.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dispatcher::ConsoleSink;

/// Broadcasts `message` every `interval` until cancelled.
///
/// The first broadcast happens one full interval after startup. A failed
/// send is logged and the schedule continues; one bad tick never cancels
/// the next.
pub async fn run_broadcast(
    interval: Duration,
    message: String,
    sink: Arc<dyn ConsoleSink>,
    cancel: CancellationToken,
) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match sink.say(&message).await {
                    Ok(()) => debug!("periodic broadcast sent"),
                    Err(e) => warn!(error = %e, "periodic broadcast failed"),
                }
            }
        }
    }

    debug!("broadcast scheduler stopped");
}

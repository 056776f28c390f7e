//! heraldd — in-game chat assistant daemon.
//!
//! Tails the game server's log for `!ask` chat commands, answers them
//! through a completion service, and relays replies into game chat over
//! RCON, alongside a periodic promotional broadcast.

mod config;
mod dispatcher;
mod logging;
mod pipeline;
mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use herald_chat::LineMatcher;
use herald_completion::CompletionClient;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::dispatcher::{ConsoleSink, Dispatcher, HttpCompleter, RconSink};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    let _guard = logging::init(&config.herald_log_dir)?;

    // Panics land in the log file too, not just on a possibly-lost stderr.
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        error!(%location, "panic: {info}");
        eprintln!("panic at {location}: {info}");
    }));

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %config.log_file.display(),
        trigger = %config.trigger,
        broadcast_interval = ?config.broadcast_interval,
        "heraldd starting"
    );

    let completer = Arc::new(HttpCompleter::new(
        CompletionClient::new(config.completion.clone()).context("completion client")?,
    ));
    let console: Arc<dyn ConsoleSink> = Arc::new(RconSink::new(config.rcon.clone()));
    let dispatcher = Arc::new(Dispatcher::new(completer, Arc::clone(&console)));

    let cancel = CancellationToken::new();

    tokio::spawn(scheduler::run_broadcast(
        config.broadcast_interval,
        config.broadcast_message.clone(),
        console,
        cancel.clone(),
    ));

    let tailer = pipeline::spawn(
        config.log_file.clone(),
        LineMatcher::new(&config.trigger),
        dispatcher,
        cancel.clone(),
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            cancel.cancel();
        }
        result = tailer => {
            // The tailer only returns on its own for startup failures.
            cancel.cancel();
            result.context("tailer task panicked")??;
        }
    }

    // In-flight dispatches are fire-and-forget broadcasts; exit promptly
    // rather than draining them.
    info!("heraldd stopped");
    Ok(())
}

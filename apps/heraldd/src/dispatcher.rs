//! Per-event dispatch: completion call, reply formatting, console delivery.
//!
//! `handle` never fails from the caller's point of view. Whatever breaks
//! downstream, the requester gets exactly one reply — the answer or a
//! fallback — and the tailer keeps running.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use herald_chat::ChatEvent;
use herald_completion::CompletionClient;
use herald_rcon::RconConfig;
use tracing::{info, warn};

/// Reply sent when the completion service could not be reached.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't think of an answer right now. Try again in a moment.";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Abstract completion service.
///
/// The daemon wires in [`HttpCompleter`]; tests use mocks.
pub trait Completer: Send + Sync {
    /// Generates an answer for the prompt.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, String>>;
}

/// Abstract path into game chat.
pub trait ConsoleSink: Send + Sync {
    /// Broadcasts one message to all players.
    fn say<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), String>>;
}

/// Handles matched chat events.
pub struct Dispatcher {
    completer: Arc<dyn Completer>,
    console: Arc<dyn ConsoleSink>,
}

impl Dispatcher {
    /// Creates a dispatcher over the given collaborators.
    pub fn new(completer: Arc<dyn Completer>, console: Arc<dyn ConsoleSink>) -> Self {
        Self { completer, console }
    }

    /// Answers one chat command. Infallible: downstream errors are logged
    /// and turned into the fallback reply.
    pub async fn handle(&self, event: ChatEvent) {
        info!(actor = %event.actor, prompt = %event.command_text, "handling chat command");

        let reply = match self.completer.generate(&event.command_text).await {
            Ok(text) => format!("[To {}] {}", event.actor, text),
            Err(e) => {
                warn!(actor = %event.actor, error = %e, "completion failed, sending fallback");
                format!("[To {}] {}", event.actor, FALLBACK_REPLY)
            }
        };

        if let Err(e) = self.console.say(&reply).await {
            warn!(actor = %event.actor, error = %e, "failed to deliver reply to game chat");
        }
    }
}

/// Production [`Completer`] backed by the completion HTTP client.
pub struct HttpCompleter {
    client: CompletionClient,
}

impl HttpCompleter {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }
}

impl Completer for HttpCompleter {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, String>> {
        Box::pin(async move { self.client.generate(prompt).await.map_err(|e| e.to_string()) })
    }
}

/// Production [`ConsoleSink`]: one RCON session per message.
pub struct RconSink {
    config: RconConfig,
}

impl RconSink {
    pub fn new(config: RconConfig) -> Self {
        Self { config }
    }
}

impl ConsoleSink for RconSink {
    fn say<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(async move {
            herald_rcon::broadcast(&self.config, text)
                .await
                .map_err(|e| e.to_string())
        })
    }
}

//! Client for a chat-completions text generation service.
//!
//! Single request/response, no streaming: a prompt goes in, a short answer
//! comes back. Answers are relayed into game chat, so a fixed system prompt
//! asks the model to keep them brief.

mod client;

pub use client::CompletionClient;

use std::time::Duration;

/// Timeout for one completion request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default chat-completions endpoint.
pub const DEFAULT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Cap on generated tokens; game chat only fits a couple of sentences.
pub const MAX_COMPLETION_TOKENS: u32 = 150;

/// Instructions sent with every prompt.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant living inside a \
game server's chat. Answer in at most two short sentences of plain text; no \
markdown, no code blocks.";

/// Connection settings for the completion service.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub url: String,
    pub model: String,
}

impl CompletionConfig {
    /// Creates a config for the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: DEFAULT_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }
}

/// Errors produced by the completion client.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("service returned no text")]
    EmptyResponse,
}

//! Daemon configuration from environment variables.
//!
//! Missing required variables or an absent server directory are startup
//! errors; the daemon refuses to run half-configured.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use herald_completion::CompletionConfig;
use herald_rcon::RconConfig;

/// Default broadcast period: two hours.
const DEFAULT_BROADCAST_INTERVAL_MS: u64 = 2 * 60 * 60 * 1000;

/// Default path of the tailed log, relative to the server directory.
const DEFAULT_LOG_FILE: &str = "logs/latest.log";

const DEFAULT_BROADCAST_MESSAGE: &str =
    "Ask me anything with !ask <question> in chat.";

/// Everything the daemon needs to run.
#[derive(Debug, Clone)]
pub struct Config {
    pub rcon: RconConfig,
    pub completion: CompletionConfig,
    /// The log file to tail.
    pub log_file: PathBuf,
    /// Where the daemon's own operational log goes.
    pub herald_log_dir: PathBuf,
    pub trigger: String,
    pub broadcast_interval: Duration,
    pub broadcast_message: String,
}

impl Config {
    /// Loads configuration from `HERALD_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let rcon = RconConfig {
            host: required("HERALD_RCON_HOST")?,
            port: required("HERALD_RCON_PORT")?
                .parse()
                .context("HERALD_RCON_PORT is not a valid port number")?,
            password: required("HERALD_RCON_PASSWORD")?,
        };

        let mut completion = CompletionConfig::new(required("HERALD_COMPLETION_API_KEY")?);
        if let Ok(url) = std::env::var("HERALD_COMPLETION_URL") {
            completion.url = url;
        }
        if let Ok(model) = std::env::var("HERALD_COMPLETION_MODEL") {
            completion.model = model;
        }

        let server_dir = PathBuf::from(required("HERALD_SERVER_DIR")?);
        if !server_dir.is_dir() {
            bail!("server directory does not exist: {}", server_dir.display());
        }
        let log_file = server_dir.join(
            std::env::var("HERALD_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.into()),
        );

        let trigger = std::env::var("HERALD_TRIGGER")
            .unwrap_or_else(|_| herald_chat::DEFAULT_TRIGGER.into());

        let interval_ms = match std::env::var("HERALD_BROADCAST_INTERVAL_MS") {
            Ok(raw) => raw
                .parse::<u64>()
                .context("HERALD_BROADCAST_INTERVAL_MS is not a number of milliseconds")?,
            Err(_) => DEFAULT_BROADCAST_INTERVAL_MS,
        };
        if interval_ms == 0 {
            bail!("HERALD_BROADCAST_INTERVAL_MS must be greater than zero");
        }

        let mut broadcast_message = std::env::var("HERALD_BROADCAST_MESSAGE")
            .unwrap_or_else(|_| DEFAULT_BROADCAST_MESSAGE.into());
        if let Ok(link) = std::env::var("HERALD_BROADCAST_LINK") {
            broadcast_message = format!("{broadcast_message} {link}");
        }

        Ok(Self {
            rcon,
            completion,
            log_file,
            herald_log_dir: server_dir.join("herald-logs"),
            trigger,
            broadcast_interval: Duration::from_millis(interval_ms),
            broadcast_message,
        })
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing required environment variable {name}"))
}

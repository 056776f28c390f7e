//! Error types for the RCON client.

/// Errors produced by the RCON client.
#[derive(Debug, thiserror::Error)]
pub enum RconError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("authentication rejected by server")]
    AuthFailed,

    #[error("connection timed out")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(String),
}

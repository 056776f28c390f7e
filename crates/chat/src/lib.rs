//! Chat event extraction from server log lines.
//!
//! The server writes one chat broadcast per line in a fixed format; the
//! matcher picks out lines whose message starts with a trigger keyword
//! (default `!ask`) and turns them into [`ChatEvent`]s. Anything else,
//! including malformed lines, is a non-match — the matcher never fails.

mod matcher;

pub use matcher::{CHAT_LINE_PATTERN, LineMatcher};

/// Default trigger keyword players use to address the assistant.
pub const DEFAULT_TRIGGER: &str = "!ask";

/// A player chat command extracted from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Name of the player who sent the message.
    pub actor: String,
    /// The message with the trigger keyword stripped and whitespace trimmed.
    pub command_text: String,
}

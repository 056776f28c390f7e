//! The line matcher: fixed-format chat record parsing.

use std::sync::LazyLock;

use regex::Regex;

use crate::ChatEvent;

/// The exact chat broadcast record the server emits, as a regex.
///
/// Vanilla servers write chat as
/// `[HH:MM:SS] [Server thread/INFO]: <name> message`. The timestamp/source
/// prefix is matched literally when present; the bare `<name> message` form
/// (as seen when another tool has already stripped the prefix) is accepted
/// too. Any change in the upstream log format means changing this constant,
/// nothing else.
pub const CHAT_LINE_PATTERN: &str =
    r"^(?:\[\d{2}:\d{2}:\d{2}\] \[Server thread/INFO\]: )?<([A-Za-z0-9_]+)> (.+)$";

static CHAT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CHAT_LINE_PATTERN).expect("chat line pattern is valid"));

/// Matches server chat lines against a trigger keyword.
#[derive(Debug, Clone)]
pub struct LineMatcher {
    trigger: String,
}

impl LineMatcher {
    /// Creates a matcher for the given trigger keyword (e.g. `!ask`).
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
        }
    }

    /// Returns the trigger keyword this matcher looks for.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Extracts a [`ChatEvent`] from one raw log line, if it is a chat
    /// broadcast whose message starts with the trigger keyword.
    ///
    /// The trigger must be followed by whitespace or end of message; a
    /// trigger with nothing after it yields no event. Malformed lines are
    /// plain non-matches.
    pub fn matches(&self, line: &str) -> Option<ChatEvent> {
        let caps = CHAT_LINE.captures(line.trim_end())?;
        let actor = caps.get(1)?.as_str();
        let message = caps.get(2)?.as_str();

        let rest = message.strip_prefix(&self.trigger)?;
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            // e.g. trigger "!ask" must not match "!askew".
            return None;
        }

        let command_text = rest.trim();
        if command_text.is_empty() {
            return None;
        }

        Some(ChatEvent {
            actor: actor.to_string(),
            command_text: command_text.to_string(),
        })
    }
}

impl Default for LineMatcher {
    fn default() -> Self {
        Self::new(crate::DEFAULT_TRIGGER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_bare_chat_line() {
        let m = LineMatcher::default();
        assert_eq!(
            m.matches("<alice> !ask what time is it"),
            Some(ChatEvent {
                actor: "alice".into(),
                command_text: "what time is it".into(),
            })
        );
    }

    #[test]
    fn matches_full_server_record() {
        let m = LineMatcher::default();
        assert_eq!(
            m.matches("[13:37:42] [Server thread/INFO]: <dave> !ask 2+2"),
            Some(ChatEvent {
                actor: "dave".into(),
                command_text: "2+2".into(),
            })
        );
    }

    #[test]
    fn non_trigger_message_is_ignored() {
        let m = LineMatcher::default();
        assert_eq!(m.matches("<bob> hello"), None);
    }

    #[test]
    fn empty_command_text_is_ignored() {
        let m = LineMatcher::default();
        assert_eq!(m.matches("<carol> !ask"), None);
        assert_eq!(m.matches("<carol> !ask   "), None);
    }

    #[test]
    fn trigger_must_be_whole_word() {
        let m = LineMatcher::default();
        assert_eq!(m.matches("<erin> !askew question"), None);
    }

    #[test]
    fn command_text_is_trimmed() {
        let m = LineMatcher::default();
        let evt = m.matches("<alice> !ask   spaced out   ").unwrap();
        assert_eq!(evt.command_text, "spaced out");
    }

    #[test]
    fn malformed_lines_are_non_matches() {
        let m = LineMatcher::default();
        assert_eq!(m.matches(""), None);
        assert_eq!(m.matches("not a chat line"), None);
        assert_eq!(m.matches("<> !ask missing actor"), None);
        assert_eq!(m.matches("[13:37:42] [Server thread/INFO]: joined the game"), None);
        assert_eq!(m.matches("<alice !ask broken brackets"), None);
    }

    #[test]
    fn non_chat_server_records_are_ignored() {
        let m = LineMatcher::default();
        // Death messages, joins etc. share the prefix but have no <name>.
        assert_eq!(
            m.matches("[13:37:42] [Server thread/INFO]: alice joined the game"),
            None
        );
        // Other threads never carry chat broadcasts.
        assert_eq!(
            m.matches("[13:37:42] [Worker-Main-1/INFO]: <alice> !ask hi"),
            None
        );
    }

    #[test]
    fn custom_trigger() {
        let m = LineMatcher::new("!oracle");
        assert!(m.matches("<alice> !oracle why").is_some());
        assert_eq!(m.matches("<alice> !ask why"), None);
    }
}

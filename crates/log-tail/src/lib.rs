//! Log file tailer for a growing, externally-rotated server log.
//!
//! [`LogTailer`] follows one append-only text file: it keeps a byte cursor,
//! wakes on filesystem notifications (with a polling fallback), reads newly
//! appended bytes, splits them into complete lines, and hands each batch to a
//! callback in file order. Truncation and rotation-by-rename both reset the
//! cursor to the start of the (new) file. After a successful start, read
//! failures are logged and retried with backoff — they are never fatal.

mod cursor;
mod lines;
mod tailer;

pub use cursor::{Cursor, Position};
pub use lines::LineBuffer;
pub use tailer::{LogTailer, OnLinesFn, TailError};

use std::time::Duration;

/// Fallback poll interval when filesystem notifications are missed.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Delay after a filesystem event before reading, so an in-progress write
/// or rotation can settle.
pub const EVENT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Backoff after a read failure before the next attempt.
pub const READ_RETRY_BACKOFF: Duration = Duration::from_secs(5);

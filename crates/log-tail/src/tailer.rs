//! The tail loop: wake on filesystem events or a poll tick, reconcile the
//! cursor against the file, read what is new, emit complete lines.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cursor::{Cursor, Position};
use crate::lines::LineBuffer;
use crate::{EVENT_DEBOUNCE, POLL_INTERVAL, READ_RETRY_BACKOFF};

/// Callback invoked with each batch of newly-read complete lines, in file
/// order. Called synchronously from the read cycle: the next batch is not
/// read until the callback returns, so ordering is preserved end to end.
pub type OnLinesFn = Box<dyn Fn(Vec<String>) + Send + Sync + 'static>;

/// Errors from the tailer.
///
/// Only startup can fail; once [`LogTailer::run`] is past its initial stat,
/// read errors are logged and retried internally.
#[derive(Debug, thiserror::Error)]
pub enum TailError {
    #[error("log file not found: {0}")]
    MissingFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("filesystem watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Identity of the file currently behind the tailed path.
///
/// Detects rotation by rename/replace: a replacement file can be as large as
/// the old cursor offset, so size comparison alone cannot see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    created: Option<std::time::SystemTime>,
}

impl FileIdentity {
    #[cfg(unix)]
    fn of(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    #[cfg(not(unix))]
    fn of(meta: &std::fs::Metadata) -> Self {
        Self {
            created: meta.created().ok(),
        }
    }
}

/// Follows one append-only log file and emits new lines to a callback.
///
/// All tailing state (cursor, partial-line buffer, file identity) lives in
/// the instance; nothing is shared. The cursor starts at the file's current
/// size, so history present before startup is never replayed.
pub struct LogTailer {
    path: PathBuf,
    cursor: Cursor,
    buffer: LineBuffer,
    identity: Option<FileIdentity>,
    on_lines: OnLinesFn,
}

impl LogTailer {
    /// Creates a tailer for the given file. The file is not touched until
    /// [`run`](Self::run).
    pub fn new(path: PathBuf, on_lines: OnLinesFn) -> Self {
        Self {
            path,
            cursor: Cursor::new(0),
            buffer: LineBuffer::new(),
            identity: None,
            on_lines,
        }
    }

    /// Runs the tail loop until `cancel` fires.
    ///
    /// Fails fast if the file does not exist at startup. After that, I/O
    /// failures are logged, backed off, and retried; rotation and truncation
    /// reset the cursor and tailing continues from the new file content.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<(), TailError> {
        let meta = match std::fs::metadata(&self.path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TailError::MissingFile(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        let size = meta.len();
        self.cursor = Cursor::new(size);
        self.identity = Some(FileIdentity::of(&meta));
        tracing::info!(file = %self.path.display(), offset = size, "tailing log file");

        // Watch the parent directory: rotation replaces the file itself, and
        // events for the old inode stop once it is renamed away.
        let (notify_tx, mut notify_rx) = mpsc::channel::<()>(16);
        let mut watcher = {
            use notify::{Event, EventKind};
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(
                        event.kind,
                        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                    ) {
                        let _ = notify_tx.try_send(());
                    }
                }
            })?
        };
        let watch_dir = self.path.parent().unwrap_or(Path::new("."));
        notify::Watcher::watch(&mut watcher, watch_dir, notify::RecursiveMode::NonRecursive)?;

        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = notify_rx.recv() => {
                    // Let an in-progress write or rotation settle, then fold
                    // queued notifications into this one cycle.
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(EVENT_DEBOUNCE) => {}
                    }
                    while notify_rx.try_recv().is_ok() {}
                    self.cycle_with_backoff(&cancel).await;
                }
                _ = poll.tick() => {
                    self.cycle_with_backoff(&cancel).await;
                }
            }
        }

        tracing::debug!(file = %self.path.display(), "tailer stopped");
        Ok(())
    }

    /// Runs one read cycle; on failure, logs and sleeps out the backoff so
    /// a persistently broken file does not spin the loop.
    async fn cycle_with_backoff(&mut self, cancel: &CancellationToken) {
        if let Err(e) = self.read_cycle() {
            tracing::warn!(
                file = %self.path.display(),
                error = %e,
                "log read failed, retrying after backoff"
            );
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(READ_RETRY_BACKOFF) => {}
            }
        }
    }

    /// One cycle: open the path fresh (a rotated path may be a new file),
    /// check whether the file behind it is still the same one, reconcile the
    /// cursor against the observed size, read the delta.
    fn read_cycle(&mut self) -> std::io::Result<()> {
        let mut file = File::open(&self.path)?;
        let meta = file.metadata()?;
        let size = meta.len();

        let identity = FileIdentity::of(&meta);
        if self.identity != Some(identity) {
            self.identity = Some(identity);
            tracing::info!(
                file = %self.path.display(),
                size,
                "log file replaced, restarting from the top"
            );
            self.buffer.clear();
            self.cursor = Cursor::new(0);
            return self.read_range(&mut file, 0, size);
        }

        match self.cursor.reconcile(size) {
            Position::Unchanged => Ok(()),
            Position::Advance { from } => self.read_range(&mut file, from, size),
            Position::Truncated => {
                tracing::info!(
                    file = %self.path.display(),
                    size,
                    "log file truncated or rotated, restarting from the top"
                );
                // Any partial fragment belonged to the old file.
                self.buffer.clear();
                self.read_range(&mut file, 0, size)
            }
        }
    }

    /// Reads `[from, to)`, feeds the line buffer, emits complete lines, and
    /// advances the cursor to `to` — the size observed at open time, so bytes
    /// appended mid-read land in the next cycle.
    fn read_range(&mut self, file: &mut File, from: u64, to: u64) -> std::io::Result<()> {
        file.seek(SeekFrom::Start(from))?;

        let mut emitted = Vec::new();
        let mut chunk = [0u8; 8192];
        let mut reader = file.take(to - from);
        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            emitted.extend(self.buffer.push(&chunk[..n]));
        }

        self.cursor.advance_to(to);

        if !emitted.is_empty() {
            tracing::debug!(
                file = %self.path.display(),
                lines = emitted.len(),
                offset = to,
                "new log lines"
            );
            (self.on_lines)(emitted);
        }
        Ok(())
    }
}

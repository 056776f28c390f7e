//! Byte cursor into the tailed file.

/// Where the next read should happen, given the file's current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Nothing new; the cursor already covers the whole file.
    Unchanged,
    /// The file grew; read from this offset up to the observed size.
    Advance {
        /// First byte not yet consumed.
        from: u64,
    },
    /// The file shrank — truncated or rotated/replaced. Read from 0.
    Truncated,
}

/// The last byte position known to have been fully consumed.
///
/// The cursor only ever moves forward, except when the file shrinks
/// underneath it (rotation or truncation), which resets it to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    byte_offset: u64,
}

impl Cursor {
    /// Creates a cursor at the given offset.
    pub fn new(byte_offset: u64) -> Self {
        Self { byte_offset }
    }

    /// Returns the current byte offset.
    pub fn offset(&self) -> u64 {
        self.byte_offset
    }

    /// Compares the cursor against the file size observed right now and
    /// decides what to do. On [`Position::Truncated`] the cursor resets to
    /// zero; otherwise it does not move — call [`Cursor::advance_to`] after
    /// the bytes have actually been read.
    pub fn reconcile(&mut self, current_size: u64) -> Position {
        if current_size < self.byte_offset {
            self.byte_offset = 0;
            Position::Truncated
        } else if current_size > self.byte_offset {
            Position::Advance {
                from: self.byte_offset,
            }
        } else {
            Position::Unchanged
        }
    }

    /// Moves the cursor to the size observed when the read started. Bytes
    /// appended mid-read are picked up by the next cycle.
    pub fn advance_to(&mut self, observed_size: u64) {
        debug_assert!(observed_size >= self.byte_offset);
        self.byte_offset = observed_size;
    }
}

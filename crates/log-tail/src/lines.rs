//! Incremental splitting of raw byte chunks into complete text lines.

/// Accumulates appended bytes and yields only complete, newline-terminated
/// lines.
///
/// A trailing fragment without a terminator is kept verbatim and prefixed to
/// the next chunk, so feeding the same bytes in any chunking produces the
/// same lines. A `\r` before the terminator is stripped. Bytes that are not
/// valid UTF-8 are replaced lossily — the server log is expected to be
/// UTF-8, but a torn multi-byte write must not kill the tailer.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds newly-read bytes and returns all complete lines, in order,
    /// without their terminators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(nl) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + nl;
            let mut line = &self.pending[start..end];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            lines.push(String::from_utf8_lossy(line).into_owned());
            start = end + 1;
        }
        self.pending.drain(..start);

        lines
    }

    /// Drops any retained partial fragment. Used when the file is rotated:
    /// the fragment belonged to the old file and must not prefix content of
    /// the new one.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Returns the retained partial fragment, if any.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}

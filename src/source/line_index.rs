//! Line boundary index for seekable sources
//!
//! The index is built by a single sequential scan that uses memchr for
//! SIMD-optimized newline detection. It is built at most once per source and
//! never invalidated afterwards, even if the underlying file changes size.

use memchr::memchr_iter;
use std::io::{self, ErrorKind, Read};

/// Size of the blocks read while scanning for newlines
const SCAN_BLOCK_SIZE: usize = 64 * 1024;

/// Byte offsets of every line start plus an end-of-data sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    ///
    /// - line_offsets[0] = 0 (first line always starts at byte 0)
    /// - line_offsets[n] = byte position after nth newline
    /// - the last entry is the end of the data
    /// - Length of this vector - 1 = number of lines
    line_offsets: Vec<u64>,

    /// Set once the scan has completed
    built: bool,
}

impl LineIndex {
    /// Create a new, unbuilt line index
    pub fn new() -> Self {
        Self {
            line_offsets: vec![0],
            built: false,
        }
    }

    /// Whether `build_from_reader` has already run to completion
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Scan `reader` from its current position to the end and record line starts
    ///
    /// Offsets are relative to the reader's starting position, so callers must
    /// rewind to the beginning of the data first. Calling this on a built index
    /// is a no-op.
    ///
    /// # Performance
    /// * O(n) in the number of bytes, one pass, constant extra memory per block
    pub fn build_from_reader<R: Read>(&mut self, mut reader: R) -> io::Result<()> {
        if self.built {
            return Ok(());
        }

        let mut offsets = vec![0u64];
        let mut block = vec![0u8; SCAN_BLOCK_SIZE];
        let mut consumed: u64 = 0;

        loop {
            let read = match reader.read(&mut block) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            for pos in memchr_iter(b'\n', &block[..read]) {
                offsets.push(consumed + pos as u64 + 1);
            }
            consumed += read as u64;
        }

        // A trailing line without a terminator still counts as a line
        if offsets.last().copied() != Some(consumed) {
            offsets.push(consumed);
        }

        self.line_offsets = offsets;
        self.built = true;
        Ok(())
    }

    /// Number of lines recorded by the scan (0 before the index is built)
    pub fn line_count(&self) -> u64 {
        (self.line_offsets.len() - 1) as u64
    }

    /// Byte offset where `line` starts, if the line exists
    pub fn line_start(&self, line: u64) -> Option<u64> {
        if line >= self.line_count() {
            return None;
        }
        self.line_offsets.get(line as usize).copied()
    }

    /// Get the raw offsets, sentinel included
    pub fn get_line_offsets(&self) -> &[u64] {
        &self.line_offsets
    }
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::new()
    }
}

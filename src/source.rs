//! Input sources with uniform chunked, seekable semantics.
//!
//! A pager needs random access by line number. Files get it from a lazily
//! built [`LineIndex`]; streams (stdin) get it from an append-only cache of
//! every line read so far. Both implement [`InputSource`], so the window,
//! search and viewer code never care which one they are driving.

pub mod file;
pub mod line_index;
pub mod stream;
pub mod validation;

pub use file::SeekableFileSource;
pub use line_index::LineIndex;
pub use stream::{CachingStreamSource, Feed, LineFeed, ReaderFeed};
pub use validation::validate_file_path;

use crate::error::Result;

/// Common contract for line-oriented input
///
/// Implementations keep a logical cursor: `get_line` returns the line at the
/// cursor and advances it, `seek_to_line` moves it.
pub trait InputSource {
    /// Read the line at the cursor and advance
    ///
    /// # Returns
    /// * `Ok(Some(line))` with the terminator stripped
    /// * `Ok(None)` when no further line is available (end of data, or a live
    ///   stream that has nothing buffered yet)
    fn get_line(&mut self) -> Result<Option<String>>;

    /// Move the cursor to `line` (0-based)
    ///
    /// # Returns
    /// * `Ok(false)` if the line does not exist; the cursor is then unspecified
    ///   but the source stays usable
    fn seek_to_line(&mut self, line: u64) -> Result<bool>;

    /// Logical line number of the cursor
    fn current_line(&self) -> u64;

    /// Total number of lines, `None` while it cannot be known yet
    ///
    /// May do I/O (a file builds its index here).
    fn total_lines(&mut self) -> Result<Option<u64>>;

    /// Total number of lines if it is already known without further I/O
    fn known_total_lines(&self) -> Option<u64>;

    /// Short name for the header/status line
    fn name(&self) -> &str;

    /// Lines that can be read without touching the underlying input
    ///
    /// Only caching sources know this; others answer `None`.
    fn buffered_lines(&self) -> Option<u64> {
        None
    }

    /// Pull up to `budget` lines that are already available without blocking
    ///
    /// Only live streams ever have such lines; the default is a no-op.
    fn ingest(&mut self, _budget: usize) -> Result<usize> {
        Ok(0)
    }
}

/// Strip the line terminator (`\n` or `\r\n`) and decode lossily
pub(crate) fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

//! Seekable file source backed by a lazily built line index
//!
//! Sequential reads go straight through a buffered file handle. The first
//! seek (or line count request) scans the whole file once to build the
//! [`LineIndex`]; every later seek is a single `lseek` to a known offset.

use crate::error::{ChunkyError, Result};
use crate::source::line_index::LineIndex;
use crate::source::validation::validate_file_path;
use crate::source::{decode_line, InputSource};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// File input with O(1) seeks after a one-time O(n) index build
#[derive(Debug)]
pub struct SeekableFileSource {
    path: PathBuf,
    name: String,
    reader: BufReader<File>,
    index: LineIndex,
    current_line: u64,
    line_buf: Vec<u8>,
}

impl SeekableFileSource {
    /// Open and validate `path`
    ///
    /// # Errors
    /// * `FileNotFound` / `NotAFile` / `FileError` when the path cannot be paged
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_file_path(path)?;

        let file = File::open(path).map_err(|e| {
            ChunkyError::file_error(format!("Failed to open file: {}", path.display()), e)
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unnamed>")
            .to_string();

        Ok(Self {
            path: path.to_path_buf(),
            name,
            reader: BufReader::new(file),
            index: LineIndex::new(),
            current_line: 0,
            line_buf: Vec::with_capacity(256),
        })
    }

    /// Build the line index if that has not happened yet
    ///
    /// The read cursor is restored afterwards so an in-progress sequential
    /// read is not disturbed.
    pub fn build_index(&mut self) -> Result<()> {
        if self.index.is_built() {
            return Ok(());
        }

        let resume_at = self.reader.stream_position()?;
        self.reader.seek(SeekFrom::Start(0))?;
        self.index
            .build_from_reader(&mut self.reader)
            .map_err(|e| ChunkyError::file_error("Failed to index file", e))?;
        self.reader.seek(SeekFrom::Start(resume_at))?;

        log::debug!(
            "indexed {} lines of {}",
            self.index.line_count(),
            self.path.display()
        );
        Ok(())
    }

    /// The line index (unbuilt until the first seek or line count request)
    pub fn index(&self) -> &LineIndex {
        &self.index
    }
}

impl InputSource for SeekableFileSource {
    fn get_line(&mut self) -> Result<Option<String>> {
        self.line_buf.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.line_buf)
            .map_err(|e| ChunkyError::file_error("Failed to read line", e))?;
        if read == 0 {
            return Ok(None);
        }

        self.current_line += 1;
        Ok(Some(decode_line(&self.line_buf)))
    }

    fn seek_to_line(&mut self, line: u64) -> Result<bool> {
        self.build_index()?;

        let Some(offset) = self.index.line_start(line) else {
            return Ok(false);
        };

        self.reader.seek(SeekFrom::Start(offset))?;
        self.current_line = line;
        Ok(true)
    }

    fn current_line(&self) -> u64 {
        self.current_line
    }

    fn total_lines(&mut self) -> Result<Option<u64>> {
        self.build_index()?;
        Ok(Some(self.index.line_count()))
    }

    fn known_total_lines(&self) -> Option<u64> {
        self.index.is_built().then(|| self.index.line_count())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Chunk window: the pagination state machine
//!
//! The window holds one chunk (at most `chunk_size` consecutive lines) plus
//! the scroll offset of the viewport inside it. Scrolling moves within the
//! chunk until it runs out, then replaces the chunk wholesale with its
//! neighbour. All bound checks use the loaded chunk's real length, so the
//! short last chunk of a file behaves like any other.
//!
//! Navigation never fails on bounds: moving past the data returns `false` and
//! leaves the previous view in place. Only I/O errors from the source are
//! reported as errors.

use crate::error::{ChunkyError, Result};
use crate::source::InputSource;

/// Loaded chunk plus viewport position
#[derive(Debug, Clone)]
pub struct ChunkWindow {
    chunk_size: usize,
    chunk_start: u64,
    lines: Vec<String>,
    scroll_offset: usize,
    viewport_height: usize,
    page_size: Option<usize>,
}

impl ChunkWindow {
    /// Create an empty window
    ///
    /// # Errors
    /// * `InvalidArgument` if `chunk_size` is zero
    pub fn new(chunk_size: usize, viewport_height: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(ChunkyError::invalid_argument(
                "chunk size must be greater than 0",
            ));
        }

        Ok(Self {
            chunk_size,
            chunk_start: 0,
            lines: Vec::new(),
            scroll_offset: 0,
            viewport_height: viewport_height.max(1),
            page_size: None,
        })
    }

    /// Page by a fixed number of lines instead of the viewport height
    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size.filter(|&n| n > 0);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_start(&self) -> u64 {
        self.chunk_start
    }

    /// 1-based chunk number for display
    pub fn chunk_number(&self) -> u64 {
        self.chunk_start / self.chunk_size as u64 + 1
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Lines of the loaded chunk
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Absolute line number of the top visible line
    pub fn cursor_line(&self) -> u64 {
        self.chunk_start + self.scroll_offset as u64
    }

    /// One past the last line of the loaded chunk
    pub fn chunk_end(&self) -> u64 {
        self.chunk_start + self.lines.len() as u64
    }

    /// Whether the absolute `line` is part of the loaded chunk
    pub fn contains(&self, line: u64) -> bool {
        line >= self.chunk_start && line < self.chunk_end()
    }

    /// Lines currently in the viewport
    pub fn visible_lines(&self) -> &[String] {
        let start = self.scroll_offset.min(self.lines.len());
        let end = (start + self.viewport_height).min(self.lines.len());
        &self.lines[start..end]
    }

    /// Whether the chunk holds `chunk_size` lines, i.e. a next chunk may exist
    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.chunk_size
    }

    /// Largest scroll offset that still fills the viewport from the chunk
    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_height)
    }

    /// Whether the bottom of the chunk is on screen
    pub fn at_chunk_bottom(&self) -> bool {
        self.scroll_offset >= self.max_scroll()
    }

    fn page_amount(&self) -> usize {
        self.page_size.unwrap_or(self.viewport_height)
    }

    fn previous_start(&self) -> u64 {
        self.chunk_start.saturating_sub(self.chunk_size as u64)
    }

    /// Adjust the viewport height (terminal resize); the position is kept
    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
    }

    /// Load the chunk starting at `start`
    ///
    /// # Returns
    /// * `false` if `start` is beyond the available data; the previous chunk
    ///   and scroll offset are left untouched
    pub fn load_chunk(&mut self, source: &mut dyn InputSource, start: u64) -> Result<bool> {
        if !source.seek_to_line(start)? {
            return Ok(false);
        }

        let mut lines = Vec::with_capacity(self.chunk_size.min(4096));
        while lines.len() < self.chunk_size {
            match source.get_line()? {
                Some(line) => lines.push(line),
                None => break,
            }
        }

        self.lines = lines;
        self.chunk_start = start;
        self.scroll_offset = 0;
        Ok(true)
    }

    /// Scroll one line down, crossing into the next chunk at the bottom
    pub fn scroll_down(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if self.scroll_offset < self.max_scroll() {
            self.scroll_offset += 1;
            return Ok(true);
        }
        self.next_chunk(source)
    }

    /// Scroll one line up, crossing into the tail of the previous chunk at the top
    pub fn scroll_up(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            return Ok(true);
        }
        self.enter_previous_chunk_at_tail(source)
    }

    /// Scroll a page down
    ///
    /// Inside a chunk the offset is clamped so the chunk tail is shown before
    /// the next chunk is loaded.
    pub fn page_down(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        let max_scroll = self.max_scroll();
        if self.scroll_offset < max_scroll {
            self.scroll_offset = (self.scroll_offset + self.page_amount()).min(max_scroll);
            return Ok(true);
        }
        self.next_chunk(source)
    }

    /// Scroll a page up, crossing into the tail of the previous chunk at the top
    pub fn page_up(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if self.scroll_offset > 0 {
            self.scroll_offset = self.scroll_offset.saturating_sub(self.page_amount());
            return Ok(true);
        }
        self.enter_previous_chunk_at_tail(source)
    }

    /// Load the chunk after the current one
    ///
    /// A partial chunk is the last one, so this is a no-op there.
    pub fn next_chunk(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if !self.is_full() {
            return Ok(false);
        }
        self.load_chunk(source, self.chunk_start + self.chunk_size as u64)
    }

    /// Load the chunk before the current one, scrolled to its top
    pub fn prev_chunk(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if self.chunk_start == 0 {
            return Ok(false);
        }
        self.load_chunk(source, self.previous_start())
    }

    fn enter_previous_chunk_at_tail(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if !self.prev_chunk(source)? {
            return Ok(false);
        }
        self.scroll_offset = self.max_scroll();
        Ok(true)
    }

    /// Load chunk `k` (0-based) directly
    pub fn jump_to_chunk(&mut self, source: &mut dyn InputSource, chunk: u64) -> Result<bool> {
        match chunk.checked_mul(self.chunk_size as u64) {
            Some(start) => self.load_chunk(source, start),
            None => Ok(false),
        }
    }

    /// Load the chunk containing `line` and put that line at the top of the view
    ///
    /// Returns `false` without touching the view if `line` does not exist.
    pub fn goto_line(&mut self, source: &mut dyn InputSource, line: u64) -> Result<bool> {
        if !source.seek_to_line(line)? {
            return Ok(false);
        }

        let start = (line / self.chunk_size as u64) * self.chunk_size as u64;
        if !self.load_chunk(source, start)? {
            return Ok(false);
        }

        self.scroll_offset = ((line - start) as usize).min(self.lines.len().saturating_sub(1));
        Ok(true)
    }

    /// Bring `line` to the top of the view, reusing the loaded chunk if it holds it
    pub fn focus_line(&mut self, source: &mut dyn InputSource, line: u64) -> Result<bool> {
        if self.contains(line) {
            self.scroll_offset = (line - self.chunk_start) as usize;
            return Ok(true);
        }
        self.goto_line(source, line)
    }

    /// Reload a partial chunk in place so lines appended to the source show up
    ///
    /// The scroll offset is kept (clamped to the new length). Returns `true`
    /// if the chunk grew.
    pub fn refresh(&mut self, source: &mut dyn InputSource) -> Result<bool> {
        if self.is_full() {
            return Ok(false);
        }

        let before = self.lines.len();
        let offset = self.scroll_offset;
        if !self.load_chunk(source, self.chunk_start)? {
            return Ok(false);
        }

        self.scroll_offset = offset.min(self.lines.len().saturating_sub(1));
        Ok(self.lines.len() > before)
    }

    /// Scroll so the bottom of the chunk is visible
    pub fn scroll_to_end(&mut self) {
        self.scroll_offset = self.max_scroll();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{CachingStreamSource, ReaderFeed};
    use std::io::Cursor;

    type MemorySource = CachingStreamSource<ReaderFeed<Cursor<Vec<u8>>>>;

    fn source_with(lines: &[&str]) -> MemorySource {
        let mut data = String::new();
        for line in lines {
            data.push_str(line);
            data.push('\n');
        }
        CachingStreamSource::new(ReaderFeed::new(Cursor::new(data.into_bytes())), "test")
    }

    fn numbered(count: usize) -> MemorySource {
        let lines: Vec<String> = (0..count).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        source_with(&refs)
    }

    fn abcde() -> MemorySource {
        source_with(&["a", "b", "c", "d", "e"])
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(matches!(
            ChunkWindow::new(0, 10),
            Err(ChunkyError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_load_chunk() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();

        assert!(window.load_chunk(&mut source, 2).unwrap());
        assert_eq!(window.lines(), &["c", "d"]);
        assert_eq!(window.chunk_start(), 2);
        assert_eq!(window.scroll_offset(), 0);
        assert_eq!(window.chunk_number(), 2);
    }

    #[test]
    fn test_load_chunk_is_idempotent() {
        let mut source = numbered(10);
        let mut window = ChunkWindow::new(4, 2).unwrap();

        window.load_chunk(&mut source, 4).unwrap();
        window.scroll_down(&mut source).unwrap();
        let first = window.lines().to_vec();

        window.load_chunk(&mut source, 4).unwrap();
        assert_eq!(window.lines(), first.as_slice());
        assert_eq!(window.scroll_offset(), 0);
    }

    #[test]
    fn test_load_beyond_end_keeps_previous_chunk() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        window.load_chunk(&mut source, 2).unwrap();
        window.scroll_offset = 1;

        assert!(!window.load_chunk(&mut source, 10).unwrap());
        assert_eq!(window.lines(), &["c", "d"]);
        assert_eq!(window.scroll_offset(), 1);
    }

    #[test]
    fn test_last_chunk_is_short() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        assert!(window.jump_to_chunk(&mut source, 2).unwrap());
        assert_eq!(window.lines(), &["e"]);
        assert!(!window.is_full());
        assert!(!window.next_chunk(&mut source).unwrap());
    }

    #[test]
    fn test_goto_line_scenario() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();

        assert!(window.goto_line(&mut source, 3).unwrap());
        assert_eq!(window.lines(), &["c", "d"]);
        assert_eq!(window.scroll_offset(), 1);
        assert_eq!(window.cursor_line(), 3);
        assert_eq!(window.visible_lines()[0], "d");
    }

    #[test]
    fn test_goto_line_out_of_range_keeps_view() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        window.goto_line(&mut source, 1).unwrap();

        assert!(!window.goto_line(&mut source, 5).unwrap());
        assert_eq!(window.chunk_start(), 0);
        assert_eq!(window.scroll_offset(), 1);
    }

    #[test]
    fn test_scroll_down_within_and_across_chunks() {
        let mut source = numbered(10);
        let mut window = ChunkWindow::new(4, 2).unwrap();
        window.load_chunk(&mut source, 0).unwrap();

        // Offsets 0..=2 keep two lines of the four-line chunk on screen
        assert!(window.scroll_down(&mut source).unwrap());
        assert!(window.scroll_down(&mut source).unwrap());
        assert_eq!(window.scroll_offset(), 2);
        assert_eq!(window.visible_lines(), &["line 2", "line 3"]);

        assert!(window.scroll_down(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 4);
        assert_eq!(window.scroll_offset(), 0);
    }

    #[test]
    fn test_scroll_down_at_end_is_noop() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 1).unwrap();
        window.goto_line(&mut source, 4).unwrap();

        assert!(!window.scroll_down(&mut source).unwrap());
        assert_eq!(window.cursor_line(), 4);
    }

    #[test]
    fn test_scroll_down_at_end_of_exactly_full_last_chunk() {
        let mut source = numbered(4);
        let mut window = ChunkWindow::new(2, 1).unwrap();
        window.goto_line(&mut source, 3).unwrap();

        assert!(!window.scroll_down(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 2);
        assert_eq!(window.scroll_offset(), 1);
    }

    #[test]
    fn test_scroll_up_at_start_is_noop() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        window.load_chunk(&mut source, 0).unwrap();

        assert!(!window.scroll_up(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 0);
        assert_eq!(window.scroll_offset(), 0);
    }

    #[test]
    fn test_scroll_up_lands_on_previous_chunk_tail() {
        let mut source = numbered(10);
        let mut window = ChunkWindow::new(4, 2).unwrap();
        window.load_chunk(&mut source, 4).unwrap();

        assert!(window.scroll_up(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 0);
        assert_eq!(window.scroll_offset(), 2);
        assert_eq!(window.visible_lines(), &["line 2", "line 3"]);
    }

    #[test]
    fn test_page_down_shows_chunk_tail_before_crossing() {
        let mut source = numbered(20);
        let mut window = ChunkWindow::new(10, 4).unwrap();
        window.load_chunk(&mut source, 0).unwrap();

        assert!(window.page_down(&mut source).unwrap());
        assert_eq!(window.scroll_offset(), 4);
        assert!(window.page_down(&mut source).unwrap());
        assert_eq!(window.scroll_offset(), 6);
        assert_eq!(window.visible_lines().last().unwrap(), "line 9");

        assert!(window.page_down(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 10);
        assert_eq!(window.scroll_offset(), 0);
    }

    #[test]
    fn test_page_up_crosses_to_previous_tail() {
        let mut source = numbered(20);
        let mut window = ChunkWindow::new(10, 4).unwrap();
        window.load_chunk(&mut source, 10).unwrap();
        window.scroll_offset = 3;

        assert!(window.page_up(&mut source).unwrap());
        assert_eq!(window.scroll_offset(), 0);
        assert!(window.page_up(&mut source).unwrap());
        assert_eq!(window.chunk_start(), 0);
        assert_eq!(window.scroll_offset(), 6);
    }

    #[test]
    fn test_configured_page_size() {
        let mut source = numbered(20);
        let mut window = ChunkWindow::new(20, 4)
            .unwrap()
            .with_page_size(Some(10));
        window.load_chunk(&mut source, 0).unwrap();

        window.page_down(&mut source).unwrap();
        assert_eq!(window.scroll_offset(), 10);
    }

    #[test]
    fn test_prev_chunk_at_start_is_noop() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        window.load_chunk(&mut source, 0).unwrap();
        assert!(!window.prev_chunk(&mut source).unwrap());
    }

    #[test]
    fn test_jump_to_chunk_overflow() {
        let mut source = abcde();
        let mut window = ChunkWindow::new(2, 10).unwrap();
        window.load_chunk(&mut source, 0).unwrap();
        assert!(!window.jump_to_chunk(&mut source, u64::MAX).unwrap());
        assert_eq!(window.lines(), &["a", "b"]);
    }

    #[test]
    fn test_focus_line_reuses_loaded_chunk() {
        let mut source = numbered(10);
        let mut window = ChunkWindow::new(5, 2).unwrap();
        window.load_chunk(&mut source, 5).unwrap();

        assert!(window.focus_line(&mut source, 8).unwrap());
        assert_eq!(window.chunk_start(), 5);
        assert_eq!(window.scroll_offset(), 3);

        assert!(window.focus_line(&mut source, 1).unwrap());
        assert_eq!(window.chunk_start(), 0);
        assert_eq!(window.scroll_offset(), 1);
    }

    #[test]
    fn test_resize_keeps_position() {
        let mut source = numbered(10);
        let mut window = ChunkWindow::new(10, 3).unwrap();
        window.goto_line(&mut source, 4).unwrap();

        window.set_viewport_height(6);
        assert_eq!(window.cursor_line(), 4);
        assert_eq!(window.visible_lines().len(), 6);

        window.set_viewport_height(0);
        assert_eq!(window.viewport_height(), 1);
    }
}

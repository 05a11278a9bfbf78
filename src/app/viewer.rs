//! Command state machine of the pager
//!
//! `Viewer` owns the input source, the chunk window and the search engine and
//! applies one `InputAction` at a time. Every error raised by a command ends
//! up on the status line; only `Quit` stops the session.
//!
//! Static and live viewing share this type. In live mode the application
//! additionally calls [`Viewer::ingest`] on every tick.

use crate::error::{parse_count, Result};
use crate::input::{InputAction, PromptKind, ScrollDirection};
use crate::render::ui::{StatusLine, ViewState};
use crate::search::SearchEngine;
use crate::source::InputSource;
use crate::window::ChunkWindow;

/// Content rows left once the header and status rows are taken
pub fn content_rows(terminal_height: u16) -> usize {
    usize::from(terminal_height.saturating_sub(2)).max(1)
}

pub struct Viewer {
    source: Box<dyn InputSource>,
    window: ChunkWindow,
    search: SearchEngine,
    status: StatusLine,
    live: bool,
    stream_closed: bool,
}

impl Viewer {
    /// # Errors
    /// * `InvalidArgument` if `chunk_size` is zero
    pub fn new(source: Box<dyn InputSource>, chunk_size: usize, viewport_height: usize) -> Result<Self> {
        Ok(Self {
            source,
            window: ChunkWindow::new(chunk_size, viewport_height)?,
            search: SearchEngine::new(),
            status: StatusLine::new(),
            live: false,
            stream_closed: false,
        })
    }

    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.window = self.window.with_page_size(page_size);
        self
    }

    /// Follow newly arriving lines (live mode)
    pub fn with_live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    /// Load the first chunk
    ///
    /// Empty input (or a live stream with nothing buffered yet) is fine.
    pub fn start(&mut self) -> Result<()> {
        self.window.load_chunk(self.source.as_mut(), 0)?;
        Ok(())
    }

    pub fn window(&self) -> &ChunkWindow {
        &self.window
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Apply one action; returns `false` when the session should end
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::Quit => return false,
            InputAction::NoAction | InputAction::InvalidInput => {}
            InputAction::Resize { height, .. } => {
                self.window.set_viewport_height(content_rows(height));
            }
            InputAction::StartPrompt(kind) => {
                self.status.clear_message();
                self.status.set_prompt(kind, String::new());
            }
            InputAction::UpdatePrompt { kind, buffer } => {
                self.status.set_prompt(kind, buffer);
            }
            InputAction::CancelPrompt => {
                self.status.clear_prompt();
            }
            InputAction::SubmitPrompt { kind, input } => {
                self.status.clear_prompt();
                let result = self.submit(kind, &input);
                self.report(result);
            }
            InputAction::NextMatch => {
                self.status.clear_message();
                let result = self
                    .search
                    .find_next(&mut self.window, self.source.as_mut())
                    .map(|_| ());
                self.report(result);
            }
            navigation => {
                self.status.clear_message();
                let result = self.navigate(navigation);
                self.report(result);
            }
        }
        true
    }

    fn navigate(&mut self, action: InputAction) -> Result<()> {
        let source = self.source.as_mut();
        let window = &mut self.window;

        match action {
            InputAction::Scroll { direction, lines } => {
                for _ in 0..lines {
                    let moved = match direction {
                        ScrollDirection::Down => window.scroll_down(source)?,
                        ScrollDirection::Up => window.scroll_up(source)?,
                    };
                    if !moved {
                        break;
                    }
                }
            }
            InputAction::PageDown => {
                window.page_down(source)?;
            }
            InputAction::PageUp => {
                window.page_up(source)?;
            }
            InputAction::NextChunk => {
                window.next_chunk(source)?;
            }
            InputAction::PreviousChunk => {
                window.prev_chunk(source)?;
            }
            _ => return Ok(()),
        }

        self.search.clear_anchor();
        Ok(())
    }

    fn submit(&mut self, kind: PromptKind, input: &str) -> Result<()> {
        match kind {
            PromptKind::Search => {
                let hit = self
                    .search
                    .search(input, &mut self.window, self.source.as_mut())?;
                log::debug!("match at line {}", hit.line);
            }
            PromptKind::Chunk => {
                // 1-based; chunk 0 does not exist and is ignored
                let number = parse_count("chunk number", input)?;
                if let Some(chunk) = number.checked_sub(1) {
                    self.window.jump_to_chunk(self.source.as_mut(), chunk)?;
                    self.search.clear_anchor();
                }
            }
            PromptKind::Line => {
                let number = parse_count("line number", input)?;
                if let Some(line) = number.checked_sub(1) {
                    self.window.goto_line(self.source.as_mut(), line)?;
                    self.search.clear_anchor();
                }
            }
        }
        Ok(())
    }

    fn report(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::debug!("command failed: {e}");
            self.status.set_message(e.to_string());
        }
    }

    /// Move newly arrived live lines into the view
    ///
    /// When the bottom of the last chunk was on screen before, the view keeps
    /// following the end of the data, moving into new chunks as they fill.
    /// The end of the stream is applied once; later ticks are no-ops.
    /// Returns `true` if anything changed.
    pub fn ingest(&mut self, budget: usize) -> Result<bool> {
        if !self.live {
            return Ok(false);
        }

        let following = self.window.at_chunk_bottom() && self.at_tail_chunk()?;

        let added = self.source.ingest(budget)?;
        let closed = self.source.known_total_lines().is_some();
        if added == 0 && (!closed || self.stream_closed) {
            return Ok(false);
        }
        self.stream_closed = closed;

        let source = self.source.as_mut();
        let changed = if self.window.is_empty() {
            self.window.load_chunk(source, self.window.chunk_start())?
        } else {
            self.window.refresh(source)?
        };

        if following {
            while self.window.is_full() && self.window.next_chunk(source)? {}
            self.window.scroll_to_end();
        }

        Ok(changed || added > 0)
    }

    /// Whether the loaded chunk holds the newest line seen so far
    fn at_tail_chunk(&mut self) -> Result<bool> {
        if !self.window.is_full() {
            return Ok(true);
        }
        // Seeking past the chunk would pull fresh lines from a stream
        if let Some(buffered) = self.source.buffered_lines() {
            return Ok(self.window.chunk_end() >= buffered);
        }
        Ok(!self.source.seek_to_line(self.window.chunk_end())?)
    }

    /// Snapshot for the renderer
    pub fn view_state(&self, width: u16, height: u16) -> ViewState {
        let visible = self.window.visible_lines();
        let total_lines = self.source.known_total_lines();

        ViewState {
            source_name: self.source.name().to_string(),
            visible_lines: visible.to_vec(),
            search_highlights: visible
                .iter()
                .map(|line| self.search.highlights(line))
                .collect(),
            status_line: self.status.clone(),
            viewport_width: width,
            viewport_height: height,
            chunk_start: self.window.chunk_start(),
            chunk_number: self.window.chunk_number(),
            first_line: self.window.cursor_line(),
            total_lines,
            live: self.live && total_lines.is_none(),
        }
    }
}

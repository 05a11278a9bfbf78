//! UI state management structures
//!
//! A `ViewState` is a snapshot of everything one frame needs. The viewer
//! builds it after every command; the renderer only reads it.

use crate::input::PromptKind;
use std::ops::Range;

/// Key summary shown when there is nothing else to say
pub const HELP_HINT: &str =
    "q:quit  ←→:chunk  ↑↓:scroll  PgUp/PgDn:page  /:search  n:next  ?:jump  g:goto";

/// Frame snapshot handed to the renderer
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Display name of the input
    pub source_name: String,

    /// Lines currently visible in the viewport
    pub visible_lines: Vec<String>,

    /// Match spans per visible line (Vec index = viewport line)
    /// Empty Vec at index means no highlights for that line
    pub search_highlights: Vec<Vec<Range<usize>>>,

    /// Status line content
    pub status_line: StatusLine,

    /// Terminal dimensions
    pub viewport_width: u16,
    pub viewport_height: u16,

    /// First line of the loaded chunk (0-based)
    pub chunk_start: u64,

    /// 1-based number of the loaded chunk
    pub chunk_number: u64,

    /// Absolute line number of the top visible line (0-based)
    pub first_line: u64,

    /// Line count, when known
    pub total_lines: Option<u64>,

    /// Input is still streaming in
    pub live: bool,
}

impl ViewState {
    pub fn new(source_name: impl Into<String>, viewport_width: u16, viewport_height: u16) -> Self {
        Self {
            source_name: source_name.into(),
            viewport_width,
            viewport_height,
            chunk_number: 1,
            ..Self::default()
        }
    }

    /// Header row, e.g. `--- Chunk 2 starting at line 1001 (lines 1001-1040 of 5000) ---`
    pub fn format_header(&self) -> String {
        let mut header = format!(
            "--- Chunk {} starting at line {}",
            self.chunk_number,
            self.chunk_start + 1
        );

        if self.visible_lines.is_empty() {
            header.push_str(" (no lines)");
        } else {
            let first = self.first_line + 1;
            let last = self.first_line + self.visible_lines.len() as u64;
            header.push_str(&format!(" (lines {first}-{last}"));
            if let Some(total) = self.total_lines {
                header.push_str(&format!(" of {total}"));
            }
            header.push(')');
        }

        if self.live {
            header.push_str(" [live]");
        }
        header.push_str(" ---");
        header
    }

    /// Status row text
    pub fn format_status(&self) -> String {
        self.status_line.format(&self.source_name)
    }
}

/// Status row: an open prompt wins over a message, which wins over the key hint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub message: Option<String>,
    pub prompt: Option<(PromptKind, String)>,
}

impl StatusLine {
    /// Create a new status line
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a temporary message
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Clear any temporary message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    pub fn set_prompt(&mut self, kind: PromptKind, buffer: impl Into<String>) {
        self.prompt = Some((kind, buffer.into()));
    }

    pub fn clear_prompt(&mut self) {
        self.prompt = None;
    }

    pub fn format(&self, source_name: &str) -> String {
        if let Some((kind, buffer)) = &self.prompt {
            return format!("{}{}", kind.label(), buffer);
        }

        match &self.message {
            Some(message) => format!("{source_name} | {message}"),
            None => format!("{source_name} | {HELP_HINT}"),
        }
    }
}

//! Forward regex search across chunk boundaries
//!
//! Patterns are compiled with ripgrep's `grep-regex` matcher, always
//! case-insensitive. The engine remembers the line of the last match so that
//! `n` resumes strictly after it; explicit navigation drops that anchor and
//! the next search starts from the top visible line instead.
//!
//! Search is forward only and does not wrap around.

use crate::error::{ChunkyError, Result};
use crate::source::InputSource;
use crate::window::ChunkWindow;
use grep_matcher::Matcher;
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use std::fmt;
use std::ops::Range;

/// A compiled, case-insensitive search pattern
#[derive(Clone)]
pub struct SearchPattern {
    source: String,
    matcher: RegexMatcher,
}

impl fmt::Debug for SearchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SearchPattern").field(&self.source).finish()
    }
}

impl SearchPattern {
    /// Compile `pattern`
    ///
    /// # Errors
    /// * `NoPattern` for an empty pattern
    /// * `SearchError` when the regex does not compile
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(ChunkyError::NoPattern);
        }

        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(true)
            .build(pattern)
            .map_err(|e| ChunkyError::search(e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            matcher,
        })
    }

    /// The pattern text as typed
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Span of the first match in `line`, empty for a zero-width match
    ///
    /// This decides whether a line matches at all; an empty line still matches
    /// patterns like `^$`.
    pub fn first_match(&self, line: &str) -> Option<Range<usize>> {
        match self.matcher.find(line.as_bytes()) {
            Ok(Some(m)) => Some(m.start()..m.end()),
            _ => None,
        }
    }

    /// Every non-empty match in `line` as an exclusive byte range
    ///
    /// Ranges are checked against the line length and UTF-8 boundaries, so
    /// they can be used to slice `line` directly.
    pub fn find_spans(&self, line: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        let _ = self.matcher.find_iter(line.as_bytes(), |m| {
            let (start, end) = (m.start(), m.end());
            if start < end
                && end <= line.len()
                && line.is_char_boundary(start)
                && line.is_char_boundary(end)
            {
                spans.push(start..end);
            }
            true
        });
        spans
    }
}

/// Where the last match was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    /// Absolute 0-based line number
    pub line: u64,
    /// First match span within that line
    pub span: Range<usize>,
}

/// Stateful search: current pattern plus the resume anchor
#[derive(Debug, Default)]
pub struct SearchEngine {
    pattern: Option<SearchPattern>,
    last_match: Option<SearchMatch>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active pattern, if any
    pub fn pattern(&self) -> Option<&SearchPattern> {
        self.pattern.as_ref()
    }

    pub fn last_match(&self) -> Option<&SearchMatch> {
        self.last_match.as_ref()
    }

    /// Forget the last match so the next `find_next` starts from the view
    pub fn clear_anchor(&mut self) {
        self.last_match = None;
    }

    /// Set a new pattern and jump to its first match after the top visible line
    ///
    /// A pattern that fails to compile leaves the previous pattern, anchor and
    /// view untouched.
    pub fn search(
        &mut self,
        pattern: &str,
        window: &mut ChunkWindow,
        source: &mut dyn InputSource,
    ) -> Result<SearchMatch> {
        let compiled = SearchPattern::new(pattern)?;
        log::debug!("search for {:?}", compiled.as_str());

        self.pattern = Some(compiled);
        self.last_match = None;
        self.find_next(window, source)
    }

    /// Move the view to the next match strictly after the anchor
    ///
    /// The loaded chunk is scanned first; after that the source is read line
    /// by line from the end of the chunk. An anchor that lies before the loaded
    /// chunk (a live view followed the tail) is resumed from the source
    /// directly. The view only changes once a match is found.
    pub fn find_next(
        &mut self,
        window: &mut ChunkWindow,
        source: &mut dyn InputSource,
    ) -> Result<SearchMatch> {
        let pattern = self.pattern.as_ref().ok_or(ChunkyError::NoPattern)?;

        let anchor = self
            .last_match
            .as_ref()
            .map_or_else(|| window.cursor_line(), |m| m.line);
        let from = anchor + 1;

        let chunk_start = window.chunk_start();
        let mut line_no = if from < chunk_start {
            from
        } else {
            // Remaining lines of the loaded chunk
            let skip = (from - chunk_start) as usize;
            let found = window
                .lines()
                .iter()
                .enumerate()
                .skip(skip)
                .find_map(|(i, line)| pattern.first_match(line).map(|span| (i, span)));

            if let Some((i, span)) = found {
                let hit = SearchMatch {
                    line: chunk_start + i as u64,
                    span,
                };
                window.focus_line(source, hit.line)?;
                self.last_match = Some(hit.clone());
                return Ok(hit);
            }

            from.max(window.chunk_end())
        };

        // Everything not yet scanned, one line at a time
        if !source.seek_to_line(line_no)? {
            return Err(ChunkyError::NotFound);
        }

        while let Some(line) = source.get_line()? {
            if let Some(span) = pattern.first_match(&line) {
                if !window.goto_line(source, line_no)? {
                    break;
                }
                let hit = SearchMatch {
                    line: line_no,
                    span,
                };
                self.last_match = Some(hit.clone());
                return Ok(hit);
            }
            line_no += 1;
        }

        Err(ChunkyError::NotFound)
    }

    /// Highlight spans for `line` under the active pattern
    pub fn highlights(&self, line: &str) -> Vec<Range<usize>> {
        self.pattern
            .as_ref()
            .map(|p| p.find_spans(line))
            .unwrap_or_default()
    }
}

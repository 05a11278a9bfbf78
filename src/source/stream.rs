//! Non-seekable stream source with an append-only line cache
//!
//! Every line pulled from the underlying feed is kept, which is what makes
//! scrolling back over already-seen stdin data possible. The cache never
//! shrinks: memory grows with the length of the stream.

use crate::error::{ChunkyError, Result};
use crate::source::{decode_line, InputSource};
use std::io::{BufRead, ErrorKind};

/// Outcome of asking a feed for its next line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// A fresh line, terminator stripped
    Line(String),
    /// Nothing available right now, but the stream is still open
    Pending,
    /// The stream has ended; no more lines will ever arrive
    Closed,
}

/// Producer of raw lines for [`CachingStreamSource`]
pub trait LineFeed {
    /// Next line, waiting for it if the feed is blocking
    fn next_line(&mut self) -> Result<Feed>;

    /// Next line only if it is available without blocking
    ///
    /// Blocking feeds cannot tell, so the default answers `Pending`.
    fn try_next_line(&mut self) -> Result<Feed> {
        Ok(Feed::Pending)
    }
}

/// Blocking feed over any buffered reader (piped stdin)
#[derive(Debug)]
pub struct ReaderFeed<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }
}

impl<R: BufRead> LineFeed for ReaderFeed<R> {
    fn next_line(&mut self) -> Result<Feed> {
        self.buf.clear();
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return Ok(Feed::Closed),
                Ok(_) => return Ok(Feed::Line(decode_line(&self.buf))),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ChunkyError::file_error("Failed to read input stream", e)),
            }
        }
    }
}

/// Stream input made seekable by caching everything it has read
#[derive(Debug)]
pub struct CachingStreamSource<F> {
    feed: F,
    name: String,
    cache: Vec<String>,
    current_line: u64,
    closed: bool,
}

impl<F: LineFeed> CachingStreamSource<F> {
    pub fn new(feed: F, name: impl Into<String>) -> Self {
        Self {
            feed,
            name: name.into(),
            cache: Vec::new(),
            current_line: 0,
            closed: false,
        }
    }

    /// Number of lines cached so far
    pub fn cached_lines(&self) -> u64 {
        self.cache.len() as u64
    }

    /// Whether the feed has reported end of stream
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Pull one line from the feed into the cache
    ///
    /// Returns `true` if the cache grew.
    fn pull(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        let feed = self.feed.next_line()?;
        Ok(self.accept(feed))
    }

    fn accept(&mut self, feed: Feed) -> bool {
        match feed {
            Feed::Line(line) => {
                self.cache.push(line);
                true
            }
            Feed::Pending => false,
            Feed::Closed => {
                log::debug!("{} closed after {} lines", self.name, self.cache.len());
                self.closed = true;
                false
            }
        }
    }
}

impl<F: LineFeed> InputSource for CachingStreamSource<F> {
    fn get_line(&mut self) -> Result<Option<String>> {
        let idx = self.current_line as usize;
        if idx >= self.cache.len() && !self.pull()? {
            return Ok(None);
        }

        self.current_line += 1;
        Ok(Some(self.cache[idx].clone()))
    }

    fn seek_to_line(&mut self, line: u64) -> Result<bool> {
        while line >= self.cached_lines() {
            if !self.pull()? {
                return Ok(false);
            }
        }

        self.current_line = line;
        Ok(true)
    }

    fn current_line(&self) -> u64 {
        self.current_line
    }

    fn total_lines(&mut self) -> Result<Option<u64>> {
        Ok(self.known_total_lines())
    }

    fn known_total_lines(&self) -> Option<u64> {
        self.closed.then(|| self.cached_lines())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn buffered_lines(&self) -> Option<u64> {
        Some(self.cached_lines())
    }

    fn ingest(&mut self, budget: usize) -> Result<usize> {
        let mut added = 0;
        while added < budget && !self.closed {
            let feed = self.feed.try_next_line()?;
            if !self.accept(feed) {
                break;
            }
            added += 1;
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io::Cursor;

    /// Scripted feed that counts how often it is asked for a line
    struct ScriptedFeed {
        script: VecDeque<Feed>,
        calls: usize,
    }

    impl ScriptedFeed {
        fn new(script: Vec<Feed>) -> Self {
            Self {
                script: script.into(),
                calls: 0,
            }
        }
    }

    impl LineFeed for ScriptedFeed {
        fn next_line(&mut self) -> Result<Feed> {
            self.calls += 1;
            Ok(self.script.pop_front().unwrap_or(Feed::Closed))
        }

        fn try_next_line(&mut self) -> Result<Feed> {
            self.next_line()
        }
    }

    fn line(s: &str) -> Feed {
        Feed::Line(s.to_string())
    }

    #[test]
    fn test_reads_then_replays_from_cache() {
        let feed = ReaderFeed::new(Cursor::new(b"x\ny\n".to_vec()));
        let mut source = CachingStreamSource::new(feed, "<stdin>");

        assert_eq!(source.get_line().unwrap().as_deref(), Some("x"));
        assert_eq!(source.get_line().unwrap().as_deref(), Some("y"));
        assert_eq!(source.get_line().unwrap(), None);
        assert!(source.is_closed());

        assert!(source.seek_to_line(0).unwrap());
        assert_eq!(source.get_line().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_cached_lines_never_hit_the_feed_again() {
        let feed = ScriptedFeed::new(vec![line("a"), line("b"), line("c")]);
        let mut source = CachingStreamSource::new(feed, "scripted");

        assert!(source.seek_to_line(2).unwrap());
        assert_eq!(source.feed.calls, 3);

        assert!(source.seek_to_line(0).unwrap());
        assert_eq!(source.get_line().unwrap().as_deref(), Some("a"));
        assert_eq!(source.get_line().unwrap().as_deref(), Some("b"));
        assert_eq!(source.get_line().unwrap().as_deref(), Some("c"));
        assert_eq!(source.feed.calls, 3);
    }

    #[test]
    fn test_seek_beyond_end_of_stream() {
        let feed = ScriptedFeed::new(vec![line("a"), line("b")]);
        let mut source = CachingStreamSource::new(feed, "scripted");

        assert!(!source.seek_to_line(5).unwrap());
        assert!(source.is_closed());
        assert_eq!(source.cached_lines(), 2);

        // Closed stream is never asked again
        let calls = source.feed.calls;
        assert!(!source.seek_to_line(5).unwrap());
        assert_eq!(source.feed.calls, calls);
        assert!(source.seek_to_line(1).unwrap());
    }

    #[test]
    fn test_buffered_lines_does_not_pull() {
        let feed = ScriptedFeed::new(vec![line("a"), line("b")]);
        let mut source = CachingStreamSource::new(feed, "scripted");

        assert_eq!(source.buffered_lines(), Some(0));
        assert!(source.seek_to_line(0).unwrap());
        assert_eq!(source.buffered_lines(), Some(1));
        assert_eq!(source.feed.calls, 1);
    }

    #[test]
    fn test_total_lines_unknown_until_closed() {
        let feed = ScriptedFeed::new(vec![line("a")]);
        let mut source = CachingStreamSource::new(feed, "scripted");

        assert_eq!(source.total_lines().unwrap(), None);
        while source.get_line().unwrap().is_some() {}
        assert_eq!(source.total_lines().unwrap(), Some(1));
    }

    #[test]
    fn test_pending_feed_does_not_close_stream() {
        let feed = ScriptedFeed::new(vec![line("a"), Feed::Pending, line("b")]);
        let mut source = CachingStreamSource::new(feed, "live");

        assert_eq!(source.get_line().unwrap().as_deref(), Some("a"));
        assert_eq!(source.get_line().unwrap(), None);
        assert!(!source.is_closed());
        assert_eq!(source.get_line().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_ingest_respects_budget_and_pending() {
        let feed = ScriptedFeed::new(vec![
            line("1"),
            line("2"),
            line("3"),
            Feed::Pending,
            line("4"),
        ]);
        let mut source = CachingStreamSource::new(feed, "live");

        assert_eq!(source.ingest(2).unwrap(), 2);
        assert_eq!(source.ingest(10).unwrap(), 1);
        assert_eq!(source.cached_lines(), 3);
        assert_eq!(source.ingest(10).unwrap(), 1);
        assert_eq!(source.ingest(10).unwrap(), 0);
        assert!(source.is_closed());
        assert_eq!(source.cached_lines(), 4);
    }

    #[test]
    fn test_blocking_reader_feed_never_ingests() {
        let feed = ReaderFeed::new(Cursor::new(b"a\nb\n".to_vec()));
        let mut source = CachingStreamSource::new(feed, "<stdin>");
        assert_eq!(source.ingest(100).unwrap(), 0);
        assert_eq!(source.cached_lines(), 0);
    }

    #[test]
    fn test_cache_grows_without_bound() {
        // Known limitation: every line ever read stays cached
        let data: String = (0..5000).map(|i| format!("{i}\n")).collect();
        let feed = ReaderFeed::new(Cursor::new(data.into_bytes()));
        let mut source = CachingStreamSource::new(feed, "<stdin>");

        while source.get_line().unwrap().is_some() {}
        assert_eq!(source.cached_lines(), 5000);
        assert!(source.seek_to_line(0).unwrap());
        assert_eq!(source.get_line().unwrap().as_deref(), Some("0"));
    }
}

//! Live-mode producer/consumer pipeline
//!
//! A dedicated reader thread pulls lines from stdin and pushes them into a
//! bounded tokio channel. A full channel blocks the producer, so a fast
//! writer cannot grow memory ahead of the display. The consumer side is a
//! [`LineReceiver`], which plugs into [`CachingStreamSource`] as a
//! non-blocking [`LineFeed`]; the render loop drains it on every tick.
//!
//! [`CachingStreamSource`]: crate::source::CachingStreamSource

use crate::error::Result;
use crate::source::{decode_line, Feed, LineFeed};
use std::io::{BufRead, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, error::TryRecvError, Receiver, Sender};

/// Default number of lines that may sit in the queue before the reader blocks
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Result of a non-blocking dequeue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeue {
    Line(String),
    /// Queue is empty but the producer is still running
    Empty,
    /// Producer has finished and every queued line has been taken
    Closed,
}

/// Consumer end of the pipeline
#[derive(Debug)]
pub struct LineReceiver {
    rx: Receiver<String>,
}

impl LineReceiver {
    /// Take the next line if one is queued; never blocks
    pub fn try_recv(&mut self) -> Dequeue {
        match self.rx.try_recv() {
            Ok(line) => Dequeue::Line(line),
            Err(TryRecvError::Empty) => Dequeue::Empty,
            Err(TryRecvError::Disconnected) => Dequeue::Closed,
        }
    }

    /// Wait for the next line; `None` once the producer is done
    ///
    /// Must not be called from inside the async runtime.
    pub fn recv_blocking(&mut self) -> Option<String> {
        self.rx.blocking_recv()
    }
}

impl LineFeed for LineReceiver {
    fn next_line(&mut self) -> Result<Feed> {
        self.try_next_line()
    }

    fn try_next_line(&mut self) -> Result<Feed> {
        Ok(match self.try_recv() {
            Dequeue::Line(line) => Feed::Line(line),
            Dequeue::Empty => Feed::Pending,
            Dequeue::Closed => Feed::Closed,
        })
    }
}

/// Handle on the background reader thread
#[derive(Debug)]
pub struct StreamPipeline {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl StreamPipeline {
    /// Start reading `reader` on a new thread
    ///
    /// Empty lines are dropped. `capacity` is clamped to at least one line.
    pub fn spawn<R>(reader: R, capacity: usize) -> (Self, LineReceiver)
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = std::thread::spawn(move || produce(reader, tx, &flag));

        (
            Self {
                cancel,
                handle: Some(handle),
            },
            LineReceiver { rx },
        )
    }

    /// Ask the producer to stop after its current read
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Whether the producer thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the producer and wait up to `grace` for it to exit
    ///
    /// Drop the [`LineReceiver`] first so a producer waiting on a
    /// full queue can observe the shutdown. A producer stuck inside a blocking
    /// read cannot be interrupted; it is detached and `false` is returned.
    pub fn shutdown(mut self, grace: Duration) -> bool {
        self.cancel();
        let Some(handle) = self.handle.take() else {
            return true;
        };

        let deadline = Instant::now() + grace;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                log::warn!("stream reader still blocked after {grace:?}, detaching it");
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        if handle.join().is_err() {
            log::warn!("stream reader thread panicked");
        }
        true
    }
}

impl Drop for StreamPipeline {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn produce<R: BufRead>(mut reader: R, tx: Sender<String>, cancel: &AtomicBool) {
    let mut buf = Vec::with_capacity(256);
    let mut sent: u64 = 0;

    loop {
        if cancel.load(Ordering::SeqCst) {
            log::debug!("stream reader cancelled after {sent} lines");
            return;
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                if line.is_empty() {
                    continue;
                }
                if tx.blocking_send(line).is_err() {
                    log::debug!("display side gone, stream reader stopping");
                    return;
                }
                sent += 1;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("stream read failed: {e}");
                return;
            }
        }
    }

    log::debug!("input stream ended after {sent} lines");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("line {i}")).collect()
    }

    fn reader_for(lines: &[String]) -> Cursor<Vec<u8>> {
        let data: String = lines.iter().map(|l| format!("{l}\n")).collect();
        Cursor::new(data.into_bytes())
    }

    /// Never-ending input
    struct Endless;

    impl Read for Endless {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let chunk = b"tick\n";
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            Ok(n)
        }
    }

    /// Input whose read blocks until the test releases it
    struct Stalled(std::sync::mpsc::Receiver<()>);

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            let _ = self.0.recv();
            Ok(0)
        }
    }

    #[test]
    fn test_lines_arrive_in_order_and_complete() {
        let expected = numbered(1000);
        let (pipeline, mut rx) = StreamPipeline::spawn(reader_for(&expected), 8);

        let mut received = Vec::new();
        loop {
            match rx.try_recv() {
                Dequeue::Line(line) => {
                    received.push(line);
                    // Whatever has been dequeued is always a prefix of the input
                    assert_eq!(received[..], expected[..received.len()]);
                }
                Dequeue::Empty => std::thread::sleep(Duration::from_millis(1)),
                Dequeue::Closed => break,
            }
        }

        assert_eq!(received, expected);
        assert!(pipeline.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let input = Cursor::new(b"a\n\nb\n\r\nc".to_vec());
        let (_pipeline, mut rx) = StreamPipeline::spawn(input, 4);

        let mut received = Vec::new();
        while let Some(line) = rx.recv_blocking() {
            received.push(line);
        }
        assert_eq!(received, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_full_queue_blocks_producer() {
        let expected = numbered(10);
        let (pipeline, mut rx) = StreamPipeline::spawn(reader_for(&expected), 2);

        std::thread::sleep(Duration::from_millis(50));
        assert!(!pipeline.is_finished());

        let mut received = Vec::new();
        while let Some(line) = rx.recv_blocking() {
            received.push(line);
        }
        assert_eq!(received, expected);
        assert!(pipeline.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_shutdown_releases_blocked_producer() {
        let (pipeline, mut rx) = StreamPipeline::spawn(BufReader::new(Endless), 4);
        assert!(matches!(rx.recv_blocking(), Some(line) if line == "tick"));

        drop(rx);
        assert!(pipeline.shutdown(Duration::from_secs(2)));
    }

    #[test]
    fn test_cancel_stops_reading() {
        let (pipeline, mut rx) = StreamPipeline::spawn(BufReader::new(Endless), 4);
        pipeline.cancel();

        // Drain what was queued before the flag was seen; the stream then closes
        let mut drained = 0;
        while rx.recv_blocking().is_some() {
            drained += 1;
            assert!(drained < 1_000_000);
        }
        assert!(pipeline.shutdown(Duration::from_secs(1)));
    }

    #[test]
    fn test_stuck_reader_is_detached() {
        let (release, stalled) = std::sync::mpsc::channel();
        let (pipeline, _rx) = StreamPipeline::spawn(BufReader::new(Stalled(stalled)), 4);

        assert!(!pipeline.shutdown(Duration::from_millis(50)));
        let _ = release.send(());
    }

    #[test]
    fn test_receiver_as_live_feed() {
        let (_pipeline, mut rx) = StreamPipeline::spawn(reader_for(&numbered(2)), 4);

        let mut lines = Vec::new();
        loop {
            match rx.try_next_line().unwrap() {
                Feed::Line(line) => lines.push(line),
                Feed::Pending => std::thread::sleep(Duration::from_millis(1)),
                Feed::Closed => break,
            }
        }
        assert_eq!(lines, numbered(2));
    }
}

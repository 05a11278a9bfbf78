//! Application orchestration layer
//!
//! `Application` wires a [`Viewer`] to the terminal: key actions arrive from
//! the input thread over an unbounded channel, live data is pulled in on a
//! timer, and every change is redrawn. The terminal is restored on every exit
//! path of [`Application::run`].

pub mod runtime;
pub mod viewer;

pub use viewer::Viewer;

use crate::config::Config;
use crate::error::{ChunkyError, Result};
use crate::input::InputAction;
use crate::pipeline::StreamPipeline;
use crate::render::ui::UIRenderer;
use crate::source::InputSource;
use runtime::spawn_input_thread;
use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// How long to wait for the live reader thread on exit
const PIPELINE_GRACE: Duration = Duration::from_millis(200);

/// Application orchestrator - coordinates viewer, input and renderer
pub struct Application {
    viewer: Viewer,
    ui_renderer: Box<dyn UIRenderer>,
    config: Config,
    pipeline: Option<StreamPipeline>,
}

impl Application {
    pub fn new(viewer: Viewer, ui_renderer: Box<dyn UIRenderer>, config: Config) -> Self {
        Self {
            viewer,
            ui_renderer,
            config,
            pipeline: None,
        }
    }

    /// Attach the live reader so it is shut down with the application
    pub fn with_pipeline(mut self, pipeline: StreamPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Run the interactive session until the user quits
    pub async fn run(mut self) -> Result<()> {
        self.ui_renderer.initialize()?;
        let result = self.event_loop().await;
        let cleanup = self.ui_renderer.cleanup();

        let Application {
            viewer, pipeline, ..
        } = self;
        // Dropping the viewer drops the live receiver, releasing a reader
        // blocked on a full queue.
        drop(viewer);
        if let Some(pipeline) = pipeline {
            pipeline.shutdown(PIPELINE_GRACE);
        }

        result.and(cleanup)
    }

    async fn event_loop(&mut self) -> Result<()> {
        let (mut width, mut height) = self.ui_renderer.get_terminal_size()?;
        self.viewer
            .handle_action(InputAction::Resize { width, height });
        self.viewer.start()?;
        if self.viewer.is_live() {
            self.viewer.ingest(self.config.live_batch)?;
        }
        self.draw(width, height)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(AtomicBool::new(false));
        let input_thread =
            spawn_input_thread(tx, Arc::clone(&shutdown), self.config.input_poll);

        let live = self.viewer.is_live();
        let mut tick = tokio::time::interval(self.config.tick);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let result = loop {
            tokio::select! {
                action = rx.recv() => {
                    let Some(action) = action else {
                        log::debug!("input channel closed");
                        break Ok(());
                    };
                    if let InputAction::Resize { width: w, height: h } = action {
                        width = w;
                        height = h;
                    }
                    if !self.viewer.handle_action(action) {
                        break Ok(());
                    }
                }
                _ = tick.tick(), if live => {
                    match self.viewer.ingest(self.config.live_batch) {
                        Ok(true) => {}
                        Ok(false) => continue,
                        Err(e) => break Err(e),
                    }
                }
            }

            if let Err(e) = self.draw(width, height) {
                break Err(e);
            }
        };

        shutdown.store(true, Ordering::SeqCst);
        if input_thread.join().is_err() {
            log::warn!("input thread panicked");
        }
        result
    }

    fn draw(&mut self, width: u16, height: u16) -> Result<()> {
        let view_state = self.viewer.view_state(width, height);
        self.ui_renderer.render(&view_state)
    }
}

/// Write the whole input to `out`, chunk by chunk
///
/// Used instead of the pager when stdout is not a terminal. A closed pipe on
/// the reading side ends the copy quietly. Returns the number of lines written.
pub fn dump_chunks(
    source: &mut dyn InputSource,
    chunk_size: usize,
    out: &mut impl Write,
) -> Result<u64> {
    if chunk_size == 0 {
        return Err(ChunkyError::invalid_argument(
            "chunk size must be greater than 0",
        ));
    }

    let mut written = 0;
    let mut chunk = Vec::with_capacity(chunk_size.min(4096));
    loop {
        chunk.clear();
        while chunk.len() < chunk_size {
            match source.get_line()? {
                Some(line) => chunk.push(line),
                None => break,
            }
        }
        if chunk.is_empty() {
            break;
        }

        for line in &chunk {
            if let Err(e) = writeln!(out, "{line}") {
                if e.kind() == ErrorKind::BrokenPipe {
                    return Ok(written);
                }
                return Err(ChunkyError::file_error("Failed to write output", e));
            }
            written += 1;
        }
    }

    out.flush()
        .or_else(|e| match e.kind() {
            ErrorKind::BrokenPipe => Ok(()),
            _ => Err(ChunkyError::file_error("Failed to write output", e)),
        })?;
    Ok(written)
}

//! # chunky - chunked terminal pager
//!
//! A terminal pager for very large text streams. Input is presented as a
//! sequence of fixed-size line chunks with random access by chunk or line,
//! case-insensitive regex search across chunk boundaries, and a live mode
//! that follows stdin as it grows without blocking key handling.
//!
//! ## Architecture
//!
//! - [`source`] - the `InputSource` trait with a lazily indexed file source and
//!   a caching stream source
//! - [`window`] - the chunk/scroll pagination state machine
//! - [`search`] - forward search with resume-from-last-match, built on ripgrep's matcher
//! - [`pipeline`] - background reader and bounded queue for live mode
//! - [`input`] - key decoding and prompt editing
//! - [`render::ui`](crate::render::ui) - frame model and the ratatui renderer
//! - [`app`] - the viewer state machine and the async event loop
//! - [`config`] - defaults, config file and CLI overrides
//! - [`error`] - centralized error types

// Core modules
pub mod config;
pub mod error;
pub mod source;

// Paging engine
pub mod pipeline;
pub mod search;
pub mod window;

// Terminal front end
pub mod app;
pub mod input;
pub mod render;

// Re-export commonly used types for convenience
pub use error::{ChunkyError, Result};

pub use app::{Application, Viewer};
pub use source::{CachingStreamSource, InputSource, LineIndex, SeekableFileSource};
pub use window::ChunkWindow;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

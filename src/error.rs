//! Error types and handling infrastructure for chunky.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! the library error type. The binary wraps it with `anyhow` for top-level context.
//!
//! ## Propagation
//!
//! - Errors raised while opening the input or parsing arguments are fatal.
//! - Errors raised by interactive commands (bad regex, no match, bad number) are
//!   recovered by the viewer and shown on the status line.
//! - Navigation past the available lines is not an error at all: navigation
//!   operations report `false` and keep the previous view.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for chunky operations.
#[derive(Error, Debug)]
pub enum ChunkyError {
    /// File system related errors (unreadable file, failed read, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Regex could not be compiled
    #[error("Regex error: {message}")]
    SearchError { message: String },

    /// The input ran out before a match was found
    #[error("Pattern not found")]
    NotFound,

    /// `n` was pressed before any pattern was entered
    #[error("No search pattern set")]
    NoPattern,

    /// A number typed by the user (chunk size, chunk number, line number) did not parse
    #[error("Invalid {what}: '{input}'")]
    SizeParse { what: &'static str, input: String },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

/// Standard Result type for chunky operations.
pub type Result<T> = std::result::Result<T, ChunkyError>;

impl ChunkyError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a SearchError with a descriptive message
    pub fn search(message: impl Into<String>) -> Self {
        Self::SearchError {
            message: message.into(),
        }
    }

    /// Create a UIError with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    /// Create a ConfigError with a descriptive message
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an InvalidArgument error with a descriptive message
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a SizeParse error for the named quantity
    pub fn size_parse(what: &'static str, input: impl Into<String>) -> Self {
        Self::SizeParse {
            what,
            input: input.into(),
        }
    }
}

/// Parse a user supplied count (chunk size, chunk number, line number).
///
/// Surrounding whitespace is ignored; anything else that is not a plain
/// unsigned integer is a [`ChunkyError::SizeParse`].
pub fn parse_count(what: &'static str, input: &str) -> Result<u64> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| ChunkyError::size_parse(what, input.trim()))
}

// Automatic conversion from io::Error to ChunkyError
impl From<std::io::Error> for ChunkyError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}

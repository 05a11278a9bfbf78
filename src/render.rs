//! Rendering subsystem.
//!
//! The frame model (`ViewState`), the `UIRenderer` seam and the ratatui
//! implementation live under [`ui`].

pub mod ui;

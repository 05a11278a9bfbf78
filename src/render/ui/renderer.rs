//! Renderer seam between the application loop and the terminal

use crate::error::Result;
use crate::render::ui::state::ViewState;

/// Anything that can draw a [`ViewState`] frame
pub trait UIRenderer {
    /// Draw one frame: header row, content rows with highlights, status row
    fn render(&mut self, view_state: &ViewState) -> Result<()>;

    /// Take over the terminal (raw mode, alternate screen, hidden cursor)
    fn initialize(&mut self) -> Result<()>;

    /// Give the terminal back; safe to call more than once
    fn cleanup(&mut self) -> Result<()>;

    /// (width, height) in cells
    fn get_terminal_size(&self) -> Result<(u16, u16)>;
}

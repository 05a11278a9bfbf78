//! Color theme and styling definitions using ratatui colors
//!
//! Themes are plain ratatui styles; the config file picks one by name.

use ratatui::style::{Color, Modifier, Style};

/// Color theme for terminal UI elements
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTheme {
    /// Normal text color (None uses terminal default)
    pub normal_text: Option<Color>,

    /// Search match highlighting
    pub search_match: Style,

    /// Chunk header row
    pub header: Style,

    /// Status line background
    pub status_bg: Color,

    /// Status line text
    pub status_fg: Color,

    /// Prompt text on the status row
    pub prompt: Style,

    /// Error/warning text
    pub error_text: Color,
}

impl Default for ColorTheme {
    /// Default color theme similar to less/more
    fn default() -> Self {
        Self {
            normal_text: None, // Use terminal default
            search_match: Style::default().fg(Color::Black).bg(Color::Yellow),
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            status_bg: Color::Blue,
            status_fg: Color::White,
            prompt: Style::default().fg(Color::White).bg(Color::Blue),
            error_text: Color::Red,
        }
    }
}

impl ColorTheme {
    /// Create a monochrome theme for terminals without color support
    pub fn monochrome() -> Self {
        Self {
            normal_text: None,
            search_match: Style::default().add_modifier(Modifier::REVERSED),
            header: Style::default().add_modifier(Modifier::BOLD),
            status_bg: Color::Black,
            status_fg: Color::White,
            prompt: Style::default().add_modifier(Modifier::BOLD),
            error_text: Color::White,
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            normal_text: Some(Color::White),
            search_match: Style::default().fg(Color::Black).bg(Color::LightYellow),
            header: Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
            status_bg: Color::White,
            status_fg: Color::Black,
            prompt: Style::default().fg(Color::Black).bg(Color::LightYellow),
            error_text: Color::LightRed,
        }
    }

    /// Look a theme up by its config name
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::default()),
            "monochrome" | "mono" => Some(Self::monochrome()),
            "high-contrast" | "high_contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    /// Style of ordinary content text
    pub fn text(&self) -> Style {
        self.normal_text
            .map_or_else(Style::default, |color| Style::default().fg(color))
    }

    /// Style of the status row
    pub fn status(&self) -> Style {
        Style::default().bg(self.status_bg).fg(self.status_fg)
    }
}

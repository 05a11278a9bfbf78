//! Terminal UI implementation using ratatui
//!
//! `TerminalUI` owns the terminal for the lifetime of the pager: raw mode and
//! the alternate screen are entered in `initialize` and left in `cleanup`,
//! which also runs from `Drop` and from a panic hook so a crash never leaves
//! the shell in raw mode.

use crate::error::{ChunkyError, Result};
use crate::render::ui::{ColorTheme, UIRenderer, ViewState};
use ratatui::crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::ops::Range;
use std::sync::Once;

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Restore the terminal before the default panic message is printed
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_terminal();
            default_hook(info);
        }));
    });
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
}

/// Terminal UI implementation with ratatui backend
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalUI {
    pub fn new() -> Self {
        Self::with_theme(ColorTheme::default())
    }

    /// Create terminal UI with custom theme
    pub fn with_theme(theme: ColorTheme) -> Self {
        Self {
            terminal: None,
            theme,
        }
    }

    pub fn is_active(&self) -> bool {
        self.terminal.is_some()
    }

    fn render_content(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let content_lines: Vec<Line> = view_state
            .visible_lines
            .iter()
            .take(area.height as usize)
            .enumerate()
            .map(|(idx, line)| {
                let highlights = view_state
                    .search_highlights
                    .get(idx)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                highlighted_line(line, highlights, theme)
            })
            .collect();

        frame.render_widget(Paragraph::new(content_lines), area);
    }

    fn render_status(frame: &mut Frame, area: Rect, view_state: &ViewState, theme: &ColorTheme) {
        let style = if view_state.status_line.prompt.is_some() {
            theme.prompt
        } else if view_state.status_line.message.is_some() {
            theme.status().fg(theme.error_text)
        } else {
            theme.status()
        };

        let status = Paragraph::new(view_state.format_status()).style(style);
        frame.render_widget(status, area);
    }
}

impl Default for TerminalUI {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a line with every match span styled
///
/// Spans that are out of order, overlapping, out of bounds or not on a char
/// boundary are skipped rather than sliced.
pub(crate) fn highlighted_line<'a>(
    content: &'a str,
    highlights: &[Range<usize>],
    theme: &ColorTheme,
) -> Line<'a> {
    let text = theme.text();
    if highlights.is_empty() {
        return Line::styled(content, text);
    }

    let mut spans = Vec::with_capacity(highlights.len() * 2 + 1);
    let mut last_end = 0;

    for range in highlights {
        if range.start < last_end {
            continue;
        }
        let (Some(before), Some(matched)) = (
            content.get(last_end..range.start),
            content.get(range.clone()),
        ) else {
            continue;
        };

        if !before.is_empty() {
            spans.push(Span::styled(before, text));
        }
        if !matched.is_empty() {
            spans.push(Span::styled(matched, theme.search_match));
        }
        last_end = range.end;
    }

    if let Some(rest) = content.get(last_end..) {
        if !rest.is_empty() {
            spans.push(Span::styled(rest, text));
        }
    }

    Line::from(spans)
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let theme = &self.theme;

            terminal.draw(move |frame| {
                let size = frame.size();

                // Header, content area, status line
                let rows = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Length(1),
                        Constraint::Min(0),
                        Constraint::Length(1),
                    ])
                    .split(size);

                let header = Paragraph::new(view_state.format_header()).style(theme.header);
                frame.render_widget(header, rows[0]);
                Self::render_content(frame, rows[1], view_state, theme);
                Self::render_status(frame, rows[2], view_state, theme);
            })?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            return Ok(());
        }

        install_panic_hook();
        enable_raw_mode()
            .map_err(|e| ChunkyError::ui(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            restore_terminal();
            return Err(ChunkyError::ui(format!("Failed to enter alternate screen: {e}")));
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => {
                self.terminal = Some(terminal);
                log::debug!("terminal initialized");
                Ok(())
            }
            Err(e) => {
                restore_terminal();
                Err(ChunkyError::ui(format!("Failed to create terminal: {e}")))
            }
        }
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.take().is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
            log::debug!("terminal restored");
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

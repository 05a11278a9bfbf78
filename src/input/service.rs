//! Key decoding and prompt editing.
//!
//! Terminal events go through a small state machine (navigation vs. an open
//! prompt) that turns them into domain-level `InputAction`s for the viewer.

use crate::error::{ChunkyError, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// What an open prompt is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Regex to search for
    Search,
    /// 1-based chunk number to jump to
    Chunk,
    /// 1-based line number to go to
    Line,
}

impl PromptKind {
    /// Text shown in front of the typed buffer
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "Search (regex): ",
            PromptKind::Chunk => "Jump to chunk number: ",
            PromptKind::Line => "Go to line number: ",
        }
    }
}

/// Current input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Navigation,
    Prompt { kind: PromptKind },
}

/// Direction for scroll actions emitted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// High-level input actions emitted by the state machine/service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Scroll {
        direction: ScrollDirection,
        lines: u64,
    },
    PageUp,
    PageDown,
    NextChunk,
    PreviousChunk,
    StartPrompt(PromptKind),
    UpdatePrompt {
        kind: PromptKind,
        buffer: String,
    },
    CancelPrompt,
    SubmitPrompt {
        kind: PromptKind,
        input: String,
    },
    NextMatch,
    Quit,
    Resize {
        width: u16,
        height: u16,
    },
    NoAction,
    InvalidInput,
}

fn plain(modifiers: KeyModifiers) -> bool {
    !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Pager key bindings plus a growable prompt buffer
#[derive(Debug)]
pub struct InputStateMachine {
    state: InputState,
    buffer: String,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self {
            state: InputState::Navigation,
            buffer: String::new(),
        }
    }

    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> InputAction {
        if key_event.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }

        match self.state {
            InputState::Navigation => self.navigation_key(key_event),
            InputState::Prompt { kind } => self.prompt_key(kind, key_event),
        }
    }

    fn navigation_key(&mut self, key_event: KeyEvent) -> InputAction {
        let modifiers = key_event.modifiers;
        match key_event.code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
            KeyCode::Char('q' | 'Q') if plain(modifiers) => InputAction::Quit,
            KeyCode::Down => InputAction::Scroll {
                direction: ScrollDirection::Down,
                lines: 1,
            },
            KeyCode::Char('j') if plain(modifiers) => InputAction::Scroll {
                direction: ScrollDirection::Down,
                lines: 1,
            },
            KeyCode::Up => InputAction::Scroll {
                direction: ScrollDirection::Up,
                lines: 1,
            },
            KeyCode::Char('k') if plain(modifiers) => InputAction::Scroll {
                direction: ScrollDirection::Up,
                lines: 1,
            },
            KeyCode::PageDown => InputAction::PageDown,
            KeyCode::Char(' ') if plain(modifiers) => InputAction::PageDown,
            KeyCode::PageUp => InputAction::PageUp,
            KeyCode::Char('b') if plain(modifiers) => InputAction::PageUp,
            KeyCode::Right => InputAction::NextChunk,
            KeyCode::Left => InputAction::PreviousChunk,
            KeyCode::Char('n') if plain(modifiers) => InputAction::NextMatch,
            KeyCode::Char('/') if plain(modifiers) => self.open_prompt(PromptKind::Search),
            KeyCode::Char('?') if plain(modifiers) => self.open_prompt(PromptKind::Chunk),
            KeyCode::Char('g') if plain(modifiers) => self.open_prompt(PromptKind::Line),
            _ => InputAction::InvalidInput,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) -> InputAction {
        self.state = InputState::Prompt { kind };
        self.buffer.clear();
        InputAction::StartPrompt(kind)
    }

    fn close_prompt(&mut self) -> String {
        self.state = InputState::Navigation;
        std::mem::take(&mut self.buffer)
    }

    fn prompt_key(&mut self, kind: PromptKind, key_event: KeyEvent) -> InputAction {
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.close_prompt();
                InputAction::CancelPrompt
            }
            KeyCode::Esc => {
                self.close_prompt();
                InputAction::CancelPrompt
            }
            KeyCode::Char(ch) if plain(key_event.modifiers) && !ch.is_control() => {
                self.buffer.push(ch);
                InputAction::UpdatePrompt {
                    kind,
                    buffer: self.buffer.clone(),
                }
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_none() {
                    self.close_prompt();
                    return InputAction::CancelPrompt;
                }
                InputAction::UpdatePrompt {
                    kind,
                    buffer: self.buffer.clone(),
                }
            }
            KeyCode::Enter => {
                let input = self.close_prompt();
                if input.trim().is_empty() {
                    InputAction::CancelPrompt
                } else {
                    InputAction::SubmitPrompt { kind, input }
                }
            }
            _ => InputAction::InvalidInput,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> InputState {
        self.state
    }
}

impl Default for InputStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Service responsible for producing high-level `InputAction`s from terminal events.
#[derive(Debug, Default)]
pub struct InputService {
    state_machine: InputStateMachine,
}

impl InputService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for a terminal event and translate it
    pub fn poll_action(&mut self, timeout: Duration) -> Result<Option<InputAction>> {
        let ready = event::poll(timeout)
            .map_err(|e| ChunkyError::ui(format!("Failed to poll for events: {e}")))?;
        if !ready {
            return Ok(None);
        }

        let event =
            event::read().map_err(|e| ChunkyError::ui(format!("Failed to read event: {e}")))?;
        Ok(self.process_event(event))
    }

    /// Translate one terminal event; key repeats, mouse and focus events yield `None`
    pub fn process_event(&mut self, event: Event) -> Option<InputAction> {
        let action = match event {
            Event::Key(key_event) => self.state_machine.handle_key_event(key_event),
            Event::Resize(width, height) => InputAction::Resize { width, height },
            _ => InputAction::NoAction,
        };

        match action {
            InputAction::NoAction | InputAction::InvalidInput => None,
            _ => Some(action),
        }
    }
}

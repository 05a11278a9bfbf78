//! Input subsystem: key decoding and prompt editing.

pub mod service;

// Modules outside this crate should prefer importing from `crate::input`
// rather than reaching into submodules.
pub use service::{
    InputAction, InputService, InputState, InputStateMachine, PromptKind, ScrollDirection,
};

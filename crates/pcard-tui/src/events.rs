//! UI event types.
//!
//! All inputs to the TUI are converted to [`UiEvent`] before the reducer
//! sees them. Async results arrive through the runtime inbox wrapped in
//! `TaskStarted`/`TaskCompleted` so the reducer can drop stale results.

use crossterm::event::Event as CrosstermEvent;
use pcard_core::controller::SignInStep;
use pcard_core::profile::{ProfileError, UserProfile};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (spinner animation, render cadence).
    Tick,

    /// Terminal input event (key, mouse, paste, resize).
    Terminal(CrosstermEvent),

    /// Authentication and the follow-up profile fetch finished.
    SignInFinished(SignInStep),

    /// Profile refresh finished for `token`.
    ProfileRefreshed {
        token: String,
        result: Result<UserProfile, ProfileError>,
    },

    /// Task lifecycle: runtime started a task (cancel token optional).
    TaskStarted { kind: TaskKind, started: TaskStarted },

    /// Task lifecycle: runtime completed a task (wraps the result event).
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
}

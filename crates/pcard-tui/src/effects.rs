//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer decides what should happen (start a login, cancel it); the
//! runtime performs the I/O and spawns the tasks.

use pcard_core::oauth::AuthRequest;
use tokio_util::sync::CancellationToken;

use crate::common::{TaskId, TaskKind};

#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Open the browser and wait for the login callback, then fetch the profile.
    StartSignIn { task: TaskId, request: AuthRequest },

    /// Re-fetch the profile with the stored token.
    RefreshProfile { task: TaskId, token: String },

    /// Cancel an in-progress task by firing its token.
    CancelTask {
        kind: TaskKind,
        token: Option<CancellationToken>,
    },
}

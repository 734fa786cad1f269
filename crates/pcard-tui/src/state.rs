//! Application state for the profile screen.
//!
//! ```text
//! AppState
//! ├── controller: ProfileController (token + profile)
//! ├── pending_login: Option<String>  (auth URL while a login runs)
//! ├── status: Option<StatusMessage>  (last outcome shown below the card)
//! ├── task_seq / tasks               (async task ids and lifecycle)
//! └── should_quit, spinner_frame
//! ```
//!
//! Only the reducer mutates this.

use pcard_core::controller::ProfileController;
use pcard_core::view::ProfileView;

use crate::common::{TaskKind, TaskSeq, Tasks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

pub struct AppState {
    pub controller: ProfileController,
    /// Authorization URL of the running login, shown so it can be opened by hand.
    pub pending_login: Option<String>,
    pub status: Option<StatusMessage>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub should_quit: bool,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(controller: ProfileController) -> Self {
        Self {
            controller,
            pending_login: None,
            status: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            should_quit: false,
            spinner_frame: 0,
        }
    }

    pub fn view(&self) -> ProfileView {
        self.controller.view()
    }

    pub fn is_signing_in(&self) -> bool {
        self.tasks.state(TaskKind::SignIn).is_running()
    }

    pub fn is_refreshing(&self) -> bool {
        self.tasks.state(TaskKind::ProfileRefresh).is_running()
    }
}

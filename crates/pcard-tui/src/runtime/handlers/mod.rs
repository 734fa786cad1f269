//! Effect handlers for the TUI runtime.
//!
//! Handlers are async functions that perform I/O and return a `UiEvent`.
//! They never touch `AppState`; the runtime spawns them and forwards the
//! returned event to the inbox.

pub mod auth;
pub mod profile;

pub use auth::*;
pub use profile::*;

//! Full-screen profile screen for pcard.

pub mod common;
pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr, stdout};

use anyhow::{Context, Result};
use pcard_core::config::OAuthConfig;
use pcard_core::controller::ProfileController;
pub use runtime::TuiRuntime;
use tracing::info;

/// Runs the interactive profile screen until the user quits.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
/// Returns an error if no terminal is attached or the terminal fails.
pub fn run_profile_screen(config: OAuthConfig) -> Result<()> {
    if !stdout().is_terminal() || !stderr().is_terminal() {
        anyhow::bail!(
            "The profile screen requires a terminal.\n\
             Use `pcard login` or `pcard profile --token ...` for non-interactive use."
        );
    }

    let controller = ProfileController::new(config).context("Failed to create profile client")?;
    info!("starting profile screen");

    let mut runtime = TuiRuntime::new(controller)?;
    runtime.run()
}

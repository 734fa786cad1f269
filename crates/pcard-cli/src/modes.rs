//! Runtime execution modes.
//!
//! - `tui`: Full-screen interactive profile screen (optional feature)

#[cfg(feature = "tui")]
pub use pcard_tui::run_profile_screen;

#[cfg(not(feature = "tui"))]
pub fn run_profile_screen(_config: pcard_core::config::OAuthConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "TUI support is disabled in this build (feature \"tui\"). Use `pcard login` instead."
    );
}

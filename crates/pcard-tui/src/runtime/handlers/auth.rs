use pcard_core::callback::BrowserAuthenticator;
use pcard_core::config::OAuthConfig;
use pcard_core::controller::run_sign_in;
use pcard_core::oauth::{AuthRequest, Authenticator};
use pcard_core::profile::ProfileClient;
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;

/// Builds the browser authenticator for a TUI login.
///
/// The TUI owns the terminal, so the browser is the only way in; the
/// cancellation token is fired by the reducer on Esc.
pub fn browser_authenticator(
    config: &OAuthConfig,
    cancel: Option<CancellationToken>,
) -> BrowserAuthenticator {
    let authenticator = BrowserAuthenticator::new(config);
    match cancel {
        Some(cancel) => authenticator.with_cancel(cancel),
        None => authenticator,
    }
}

/// Runs the login and profile fetch, returning the result as an event.
pub async fn sign_in<A>(client: ProfileClient, authenticator: A, request: AuthRequest) -> UiEvent
where
    A: Authenticator + Sync,
{
    UiEvent::SignInFinished(run_sign_in(&client, &authenticator, &request).await)
}

//! Login command handler.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use pcard_core::callback::{BrowserAuthenticator, NO_BROWSER_ENV};
use pcard_core::config::{CLIENT_ID_ENV, OAuthConfig};
use pcard_core::controller::{ProfileController, SignInOutcome, SignInStep, run_sign_in};
use pcard_core::oauth::{PastedRedirect, mask_token};
use pcard_core::view::ProfileCard;

pub async fn login(oauth: &OAuthConfig) -> Result<()> {
    if !oauth.has_client_id() {
        anyhow::bail!(
            "No OAuth client id configured.\n\
             Set {CLIENT_ID_ENV}, pass --client-id, or set oauth.client_id in the config file."
        );
    }

    let mut controller =
        ProfileController::new(oauth.clone()).context("create profile client")?;
    let request = controller.auth_request();

    println!("To log in with Google:");
    println!();
    println!("  1. A browser window will open (or visit the URL below)");
    println!("  2. Sign in and allow access to your basic profile");
    println!("  3. If redirected to this machine, return here to continue");
    println!("  4. Otherwise, paste the full redirect URL");
    println!();
    println!("Authorization URL:");
    println!("  {}", request.url);
    println!();

    // Prefer the local callback in interactive sessions, fall back to manual paste.
    let use_callback = io::stdin().is_terminal() && request.redirect_uri.is_some();
    let step = if use_callback {
        println!("Waiting for the browser callback...");
        let authenticator = BrowserAuthenticator::new(oauth);
        run_sign_in(controller.client(), &authenticator, &request).await
    } else {
        // Try to open browser (best effort, skip in tests)
        if std::env::var_os(NO_BROWSER_ENV).is_none() {
            let _ = open::that(&request.url);
        }
        print!("Paste the redirect URL (or access token): ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        println!();
        run_sign_in(controller.client(), &PastedRedirect::new(input), &request).await
    };

    let reason = match &step {
        SignInStep::NotAuthenticated(response) => response.error_message(),
        _ => None,
    };

    match controller.apply(step).context("Login failed")? {
        SignInOutcome::SignedIn(profile) => {
            let token = controller.token().map(mask_token).unwrap_or_default();
            println!("✓ Logged in (token: {token})");
            println!();
            print!("{}", ProfileCard::from_profile(&profile).to_text());
            Ok(())
        }
        SignInOutcome::NotAuthenticated(kind) => {
            anyhow::bail!(reason.unwrap_or_else(|| format!("Login ended: {kind}")))
        }
    }
}

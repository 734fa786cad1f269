//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pcard_core::controller::{SignInError, SignInOutcome, SignInStep};
use pcard_core::oauth::AuthResultType;
use tracing::debug;

use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, StatusMessage};

/// The main reducer function.
///
/// Takes the current state and an event, mutates state, and returns effects
/// for the runtime to execute.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
        UiEvent::TaskStarted { kind, started } => {
            app.tasks.state_mut(kind).on_started(&started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            if app.tasks.state_mut(kind).finish_if_active(completed.id) {
                update(app, *completed.result)
            } else {
                debug!(?kind, "dropping stale task result");
                vec![]
            }
        }
        UiEvent::SignInFinished(step) => {
            handle_sign_in_finished(app, step);
            vec![]
        }
        UiEvent::ProfileRefreshed { token, result } => {
            match app.controller.apply_profile(&token, result) {
                Ok(profile) => {
                    app.status = Some(StatusMessage::info(format!(
                        "Profile refreshed for {}.",
                        profile.name
                    )));
                }
                Err(SignInError::NotSignedIn) => {}
                Err(err) => app.status = Some(StatusMessage::error(err.to_string())),
            }
            vec![]
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        let mut effects = cancel_sign_in(app);
        effects.push(UiEffect::Quit);
        return effects;
    }

    if app.pending_login.is_some() {
        return match key.code {
            KeyCode::Esc => {
                app.status = Some(StatusMessage::info("Cancelling login..."));
                cancel_sign_in(app)
            }
            _ => vec![],
        };
    }

    if app.view().is_signed_in() {
        match key.code {
            KeyCode::Char('o') => logout(app),
            KeyCode::Char('r') => start_refresh(app),
            KeyCode::Char('q') => vec![UiEffect::Quit],
            _ => vec![],
        }
    } else {
        match key.code {
            KeyCode::Enter | KeyCode::Char('l') => start_sign_in(app),
            KeyCode::Char('r') if app.controller.is_authenticated() => start_refresh(app),
            KeyCode::Char('q') | KeyCode::Esc => vec![UiEffect::Quit],
            _ => vec![],
        }
    }
}

fn start_sign_in(app: &mut AppState) -> Vec<UiEffect> {
    if !app.controller.config().has_client_id() {
        app.status = Some(StatusMessage::error(
            "No OAuth client id configured. Set PCARD_CLIENT_ID or oauth.client_id.",
        ));
        return vec![];
    }

    let request = app.controller.auth_request();
    let task = app.task_seq.next_id();
    app.pending_login = Some(request.url.clone());
    app.status = None;
    vec![UiEffect::StartSignIn { task, request }]
}

fn cancel_sign_in(app: &AppState) -> Vec<UiEffect> {
    if app.pending_login.is_none() {
        return vec![];
    }
    vec![UiEffect::CancelTask {
        kind: TaskKind::SignIn,
        token: app.tasks.sign_in.cancel.clone(),
    }]
}

fn start_refresh(app: &mut AppState) -> Vec<UiEffect> {
    if app.is_refreshing() {
        return vec![];
    }
    let Some(token) = app.controller.token().map(ToString::to_string) else {
        return vec![];
    };
    let task = app.task_seq.next_id();
    app.status = Some(StatusMessage::info("Refreshing profile..."));
    vec![UiEffect::RefreshProfile { task, token }]
}

fn logout(app: &mut AppState) -> Vec<UiEffect> {
    app.controller.logout();
    app.tasks.profile_refresh.clear();
    app.status = Some(StatusMessage::info("Logged out."));
    vec![]
}

fn handle_sign_in_finished(app: &mut AppState, step: SignInStep) {
    app.pending_login = None;

    let not_authenticated_reason = match &step {
        SignInStep::NotAuthenticated(response) => response.error_message(),
        _ => None,
    };

    app.status = match app.controller.apply(step) {
        Ok(SignInOutcome::SignedIn(profile)) if profile.name.is_empty() => Some(
            StatusMessage::error("Signed in, but the profile has no name to show."),
        ),
        Ok(SignInOutcome::SignedIn(profile)) => {
            Some(StatusMessage::info(format!("Signed in as {}.", profile.name)))
        }
        Ok(SignInOutcome::NotAuthenticated(kind)) => {
            let text = not_authenticated_reason.unwrap_or_else(|| format!("Login ended: {kind}."));
            Some(match kind {
                AuthResultType::Error => StatusMessage::error(text),
                _ => StatusMessage::info(text),
            })
        }
        Err(err) => Some(StatusMessage::error(err.to_string())),
    };
}

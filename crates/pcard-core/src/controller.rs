//! Profile screen controller.
//!
//! Owns the two pieces of session state (access token and profile) and
//! implements sign-in as two explicit steps: authenticate, then fetch the
//! profile with the returned token. Frontends that run the steps on their
//! own tasks use [`run_sign_in`] and hand the result back through
//! [`ProfileController::apply`].

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OAuthConfig;
use crate::oauth::{AuthRequest, AuthResponse, AuthResultType, Authenticator, mask_token};
use crate::profile::{ProfileClient, ProfileError, UserProfile};
use crate::view::ProfileView;

#[derive(Debug, Error)]
pub enum SignInError {
    #[error("Login succeeded but no access token was returned.")]
    MissingAccessToken,

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Not signed in.")]
    NotSignedIn,
}

/// How a completed sign-in ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(UserProfile),
    /// The authenticator reported something other than success. State is
    /// unchanged.
    NotAuthenticated(AuthResultType),
}

/// Raw result of the two sign-in steps, before it touches controller state.
#[derive(Debug)]
pub enum SignInStep {
    NotAuthenticated(AuthResponse),
    MissingAccessToken,
    Completed {
        token: String,
        profile: UserProfile,
    },
    ProfileFailed {
        token: String,
        error: ProfileError,
    },
}

/// Runs authentication followed by the profile fetch.
///
/// Does not touch any controller state, so it can run on a spawned task.
pub async fn run_sign_in<A: Authenticator>(
    client: &ProfileClient,
    authenticator: &A,
    request: &AuthRequest,
) -> SignInStep {
    let response = authenticator.authenticate(request).await;
    if !response.is_success() {
        info!(result = %response.kind, "login did not complete");
        return SignInStep::NotAuthenticated(response);
    }

    let Some(token) = response.access_token().map(ToString::to_string) else {
        warn!("login succeeded without an access token");
        return SignInStep::MissingAccessToken;
    };

    info!(token = %mask_token(&token), "login succeeded, fetching profile");
    match client.fetch(&token).await {
        Ok(profile) => SignInStep::Completed { token, profile },
        Err(error) => SignInStep::ProfileFailed { token, error },
    }
}

/// State holder for the profile screen.
#[derive(Debug, Clone)]
pub struct ProfileController {
    config: OAuthConfig,
    client: ProfileClient,
    token: Option<String>,
    profile: UserProfile,
}

impl ProfileController {
    /// Creates a signed-out controller.
    ///
    /// # Errors
    /// Returns an error if the profile client cannot be built from `config`.
    pub fn new(config: OAuthConfig) -> Result<Self, ProfileError> {
        let client = ProfileClient::new(&config)?;
        Ok(Self {
            config,
            client,
            token: None,
            profile: UserProfile::default(),
        })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Shared HTTP client, cheap to clone into tasks.
    pub fn client(&self) -> &ProfileClient {
        &self.client
    }

    /// A fresh authorization request (new `state` each time).
    pub fn auth_request(&self) -> AuthRequest {
        AuthRequest::new(&self.config)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Authenticates with `authenticator` and loads the profile.
    ///
    /// # Errors
    /// Returns [`SignInError::MissingAccessToken`] if a success carried no
    /// token, or [`SignInError::Profile`] if the fetch failed (the token is
    /// kept in that case).
    pub async fn sign_in<A: Authenticator>(
        &mut self,
        authenticator: &A,
    ) -> Result<SignInOutcome, SignInError> {
        let request = self.auth_request();
        let step = run_sign_in(&self.client, authenticator, &request).await;
        self.apply(step)
    }

    /// Stores the result of [`run_sign_in`].
    ///
    /// # Errors
    /// Same as [`ProfileController::sign_in`].
    pub fn apply(&mut self, step: SignInStep) -> Result<SignInOutcome, SignInError> {
        match step {
            SignInStep::NotAuthenticated(response) => {
                Ok(SignInOutcome::NotAuthenticated(response.kind))
            }
            SignInStep::MissingAccessToken => Err(SignInError::MissingAccessToken),
            SignInStep::Completed { token, profile } => {
                self.token = Some(token);
                self.profile = profile.clone();
                Ok(SignInOutcome::SignedIn(profile))
            }
            SignInStep::ProfileFailed { token, error } => {
                warn!(error = %error, "profile fetch failed after login");
                // A profile never outlives the token it was fetched with.
                if self.token.as_deref() != Some(token.as_str()) {
                    self.profile = UserProfile::default();
                }
                self.token = Some(token);
                Err(SignInError::Profile(error))
            }
        }
    }

    /// Re-fetches the profile with the stored token.
    ///
    /// # Errors
    /// Returns [`SignInError::NotSignedIn`] without a token, or
    /// [`SignInError::Profile`] if the fetch failed.
    pub async fn fetch_profile(&mut self) -> Result<UserProfile, SignInError> {
        let token = self.token.clone().ok_or(SignInError::NotSignedIn)?;
        let result = self.client.fetch(&token).await;
        self.apply_profile(&token, result)
    }

    /// Stores a profile fetched for `token`.
    ///
    /// Results for a token that is no longer current (logout or a newer
    /// login in between) are dropped.
    ///
    /// # Errors
    /// Returns [`SignInError::NotSignedIn`] for stale results and
    /// [`SignInError::Profile`] for failed fetches.
    pub fn apply_profile(
        &mut self,
        token: &str,
        result: Result<UserProfile, ProfileError>,
    ) -> Result<UserProfile, SignInError> {
        if self.token.as_deref() != Some(token) {
            debug!("dropping profile result for a stale token");
            return Err(SignInError::NotSignedIn);
        }
        let profile = result?;
        self.profile = profile.clone();
        Ok(profile)
    }

    /// Clears token and profile. The token is not revoked.
    pub fn logout(&mut self) {
        if self.token.take().is_some() {
            info!("logged out");
        }
        self.profile = UserProfile::default();
    }

    pub fn view(&self) -> ProfileView {
        ProfileView::from_profile(&self.profile)
    }
}

//! OAuth implicit-grant helpers.
//!
//! Builds the provider authorization URL and turns whatever comes back from
//! the browser (a redirect URL, a bare fragment, or a pasted token) into an
//! [`AuthResponse`]. Tokens are never logged or displayed in full.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;

/// Error code used when the provider redirect carried a different `state`.
pub const STATE_MISMATCH: &str = "state_mismatch";

/// Error code used when a redirect had neither a token nor an error.
pub const MISSING_ACCESS_TOKEN: &str = "missing_access_token";

/// Outcome kind reported by an interactive authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthResultType {
    /// The provider returned an access token.
    Success,
    /// The user denied access on the provider page.
    Cancel,
    /// The flow was abandoned (closed, timed out, or cancelled locally).
    Dismiss,
    /// The provider or the local flow reported an error.
    Error,
}

impl AuthResultType {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthResultType::Success => "success",
            AuthResultType::Cancel => "cancel",
            AuthResultType::Dismiss => "dismiss",
            AuthResultType::Error => "error",
        }
    }
}

impl fmt::Display for AuthResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an interactive authentication: `{ type, params }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "type")]
    pub kind: AuthResultType,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl AuthResponse {
    pub fn new(kind: AuthResultType, params: HashMap<String, String>) -> Self {
        Self { kind, params }
    }

    /// A successful response carrying `access_token`.
    pub fn success(access_token: impl Into<String>) -> Self {
        Self::new(
            AuthResultType::Success,
            HashMap::from([("access_token".to_string(), access_token.into())]),
        )
    }

    pub fn dismissed() -> Self {
        Self::new(AuthResultType::Dismiss, HashMap::new())
    }

    pub fn cancelled() -> Self {
        Self::new(
            AuthResultType::Cancel,
            HashMap::from([("error".to_string(), "access_denied".to_string())]),
        )
    }

    /// An error response with an `error` code and optional description.
    pub fn error(code: &str, description: Option<&str>) -> Self {
        let mut params = HashMap::from([("error".to_string(), code.to_string())]);
        if let Some(description) = description {
            params.insert("error_description".to_string(), description.to_string());
        }
        Self::new(AuthResultType::Error, params)
    }

    pub fn is_success(&self) -> bool {
        self.kind == AuthResultType::Success
    }

    /// Returns the access token, only for successful responses.
    pub fn access_token(&self) -> Option<&str> {
        if !self.is_success() {
            return None;
        }
        self.params
            .get("access_token")
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }

    /// Human-readable reason for a non-success response.
    pub fn error_message(&self) -> Option<String> {
        match self.kind {
            AuthResultType::Success => None,
            AuthResultType::Dismiss => Some("Login was dismissed.".to_string()),
            AuthResultType::Cancel => Some("Login was cancelled.".to_string()),
            AuthResultType::Error => {
                let code = self.params.get("error").map_or("unknown_error", String::as_str);
                Some(match self.params.get("error_description") {
                    Some(description) => format!("Login failed ({code}): {description}"),
                    None => format!("Login failed ({code})."),
                })
            }
        }
    }
}

/// Everything an authenticator needs to drive one login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    /// Full provider authorization URL.
    pub url: String,
    /// Anti-forgery value sent as `state`.
    pub state: String,
    /// Redirect target, if one was sent.
    pub redirect_uri: Option<String>,
}

impl AuthRequest {
    /// Builds a request with a fresh random `state`.
    pub fn new(config: &OAuthConfig) -> Self {
        Self::with_state(config, uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn with_state(config: &OAuthConfig, state: String) -> Self {
        Self {
            url: build_auth_url(config, Some(&state)),
            redirect_uri: config.redirect_uri().map(ToString::to_string),
            state,
        }
    }
}

/// Interactive authentication seam.
///
/// Implementations open whatever UI the platform offers and report back how
/// it ended. They never fail with an error; failures are `Error`/`Dismiss`
/// responses so callers can treat every outcome uniformly.
pub trait Authenticator {
    fn authenticate(&self, request: &AuthRequest) -> impl Future<Output = AuthResponse> + Send;
}

/// Authenticator backed by a redirect URL the user already pasted.
#[derive(Debug, Clone)]
pub struct PastedRedirect {
    input: String,
}

impl PastedRedirect {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl Authenticator for PastedRedirect {
    async fn authenticate(&self, request: &AuthRequest) -> AuthResponse {
        parse_redirect(&self.input, Some(&request.state))
    }
}

/// Build the authorization URL for the implicit grant.
pub fn build_auth_url(config: &OAuthConfig, state: Option<&str>) -> String {
    let scope = config.scope_param();
    let mut params = vec![("client_id", config.client_id.as_str())];
    if let Some(redirect_uri) = config.redirect_uri() {
        params.push(("redirect_uri", redirect_uri));
    }
    params.push(("response_type", config.response_type.as_str()));
    params.push(("scope", scope.as_str()));
    if let Some(state) = state {
        params.push(("state", state));
    }

    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish();

    format!("{}?{query}", config.auth_url)
}

/// Parses a redirect (URL, fragment, query string or bare token).
///
/// Parameters come from the fragment when present, otherwise the query.
/// A `state` that differs from `expected_state` turns the response into an
/// error; a missing `state` is accepted.
pub fn parse_redirect(input: &str, expected_state: Option<&str>) -> AuthResponse {
    let value = input.trim();
    if value.is_empty() {
        return AuthResponse::dismissed();
    }

    let params = redirect_params(value);

    if let Some(expected) = expected_state
        && let Some(state) = params.get("state")
        && state != expected
    {
        return AuthResponse::error(STATE_MISMATCH, Some("The redirect did not match this login."));
    }

    let has_token = params
        .get("access_token")
        .is_some_and(|token| !token.is_empty());
    let kind = match params.get("error").map(String::as_str) {
        Some("access_denied") => AuthResultType::Cancel,
        Some(_) => AuthResultType::Error,
        None if has_token => AuthResultType::Success,
        None => AuthResultType::Error,
    };

    let mut params = params;
    if kind == AuthResultType::Error && !params.contains_key("error") {
        params.insert("error".to_string(), MISSING_ACCESS_TOKEN.to_string());
    }
    AuthResponse::new(kind, params)
}

fn redirect_params(value: &str) -> HashMap<String, String> {
    if let Ok(url) = url::Url::parse(value) {
        return match url.fragment().filter(|fragment| !fragment.is_empty()) {
            Some(fragment) => parse_pairs(fragment),
            None => url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        };
    }

    let pairs = if let Some((_, fragment)) = value.split_once('#') {
        fragment
    } else if let Some((_, query)) = value.split_once('?') {
        query
    } else {
        value
    };

    if !pairs.contains('=') {
        return HashMap::from([("access_token".to_string(), pairs.to_string())]);
    }

    parse_pairs(pairs)
}

fn parse_pairs(pairs: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(pairs.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 12 {
        return "***".to_string();
    }
    match token.get(..8) {
        Some(prefix) => format!("{prefix}..."),
        None => "***".to_string(),
    }
}

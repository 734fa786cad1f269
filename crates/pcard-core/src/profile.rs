//! Google userinfo client.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OAuthConfig;
use crate::oauth::mask_token;

/// Profile returned by the userinfo endpoint.
///
/// Every field defaults to empty and unknown fields are ignored. Values are
/// kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub locale: String,
    pub picture: String,
}

impl UserProfile {
    /// True when no field carries a value.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid userinfo URL '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Profile request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Profile request returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Profile response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the userinfo endpoint.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    http: reqwest::Client,
    endpoint: url::Url,
}

impl ProfileClient {
    /// Builds a client from the `oauth` config section.
    ///
    /// # Errors
    /// Returns an error if `userinfo_url` is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn new(config: &OAuthConfig) -> Result<Self, ProfileError> {
        let endpoint =
            url::Url::parse(&config.userinfo_url).map_err(|source| ProfileError::InvalidEndpoint {
                url: config.userinfo_url.clone(),
                source,
            })?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ProfileError::Client)?;

        Ok(Self { http, endpoint })
    }

    /// The request URL for `token` (`?alt=json&access_token=...`).
    pub fn profile_url(&self, token: &str) -> url::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("alt", "json")
            .append_pair("access_token", token);
        url
    }

    /// Fetches the profile for `token` with a single GET.
    ///
    /// # Errors
    /// Returns [`ProfileError::Status`] for non-2xx responses,
    /// [`ProfileError::Request`] for transport failures and
    /// [`ProfileError::Decode`] for malformed bodies.
    pub async fn fetch(&self, token: &str) -> Result<UserProfile, ProfileError> {
        let body = self.fetch_body(token).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches the userinfo document as the provider sent it, fields the
    /// profile does not model included.
    ///
    /// # Errors
    /// Same as [`ProfileClient::fetch`].
    pub async fn fetch_raw(&self, token: &str) -> Result<serde_json::Value, ProfileError> {
        let body = self.fetch_body(token).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_body(&self, token: &str) -> Result<String, ProfileError> {
        debug!(token = %mask_token(token), endpoint = %self.endpoint, "fetching profile");

        let response = self.http.get(self.profile_url(token)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "profile request rejected");
            return Err(ProfileError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer) -> ProfileClient {
        let config = OAuthConfig {
            userinfo_url: format!("{}/oauth2/v2/userinfo", server.uri()),
            ..OAuthConfig::default()
        };
        ProfileClient::new(&config).unwrap()
    }

    #[test]
    fn test_profile_url_carries_token() {
        let client = ProfileClient::new(&OAuthConfig::default()).unwrap();
        assert_eq!(
            client.profile_url("abc123").as_str(),
            "https://www.googleapis.com/oauth2/v2/userinfo?alt=json&access_token=abc123"
        );
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = OAuthConfig {
            userinfo_url: "not a url".to_string(),
            ..OAuthConfig::default()
        };
        assert!(matches!(
            ProfileClient::new(&config),
            Err(ProfileError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_profile_ignores_unknown_and_missing_fields() {
        let profile: UserProfile =
            serde_json::from_value(json!({"name": "Ana Silva", "id": "42", "verified_email": true}))
                .unwrap();
        assert_eq!(profile.name, "Ana Silva");
        assert_eq!(profile.email, "");
        assert!(!profile.is_empty());
        assert!(UserProfile::default().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_sends_single_get_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .and(query_param("alt", "json"))
            .and(query_param("access_token", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Ana Silva",
                "given_name": "Ana",
                "family_name": "Silva",
                "email": "ana@example.com",
                "locale": "pt-BR",
                "picture": "https://x/y.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).fetch("abc123").await.unwrap();
        assert_eq!(profile.given_name, "Ana");
        assert_eq!(profile.locale, "pt-BR");
        assert_eq!(profile.picture, "https://x/y.png");
    }

    #[tokio::test]
    async fn test_fetch_raw_keeps_provider_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/v2/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "42",
                "name": "Ana Silva",
                "verified_email": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let raw = client_for(&server).fetch_raw("abc123").await.unwrap();
        assert_eq!(raw["id"], "42");
        assert_eq!(raw["verified_email"], true);
        assert_eq!(raw["name"], "Ana Silva");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_token"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("expired").await.unwrap_err();
        match err {
            ProfileError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("abc123").await.unwrap_err();
        assert!(matches!(err, ProfileError::Decode(_)));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let config = OAuthConfig {
            userinfo_url: "http://127.0.0.1:1/userinfo".to_string(),
            ..OAuthConfig::default()
        };
        let err = ProfileClient::new(&config)
            .unwrap()
            .fetch("abc123")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Request(_)));
    }
}

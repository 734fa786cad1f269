//! Configuration management for pcard.
//!
//! Loads configuration from ${PCARD_HOME}/config.toml with sensible defaults.
//! Environment variables and CLI flags are layered on top by the caller.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding `oauth.client_id`.
pub const CLIENT_ID_ENV: &str = "PCARD_CLIENT_ID";

/// Env var overriding `oauth.redirect_uri` (empty string omits it).
pub const REDIRECT_URI_ENV: &str = "PCARD_REDIRECT_URI";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for pcard configuration and data directories.
    //!
    //! PCARD_HOME resolution order:
    //! 1. PCARD_HOME environment variable (if set)
    //! 2. ~/.config/pcard (default)

    use std::path::PathBuf;

    /// Returns the pcard home directory.
    pub fn pcard_home() -> PathBuf {
        if let Ok(home) = std::env::var("PCARD_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".pcard"),
            |h| h.join(".config").join("pcard"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        pcard_home().join("config.toml")
    }

    /// Returns the directory for rolling log files.
    pub fn logs_dir() -> PathBuf {
        pcard_home().join("logs")
    }
}

/// OAuth client settings.
///
/// This is the explicit configuration object handed to the controller at
/// construction; nothing reads the environment after this is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// OAuth client id (public).
    pub client_id: String,
    /// Redirect target sent to the provider. Empty omits the parameter.
    pub redirect_uri: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
    /// OAuth response type (`token` for the implicit grant).
    pub response_type: String,
    /// Provider authorization endpoint.
    pub auth_url: String,
    /// Profile endpoint.
    pub userinfo_url: String,
    /// Seconds to wait for the local browser callback.
    pub callback_timeout_secs: u64,
    /// Profile request timeout in seconds (0 disables)
    pub request_timeout_secs: u64,
}

impl OAuthConfig {
    pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8765/callback";
    pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
    pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
    const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 120;

    /// Returns the redirect URI if one is configured.
    pub fn redirect_uri(&self) -> Option<&str> {
        let trimmed = self.redirect_uri.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Returns the scopes joined the way the `scope` parameter expects.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn has_client_id(&self) -> bool {
        !self.client_id.trim().is_empty()
    }

    pub fn callback_timeout(&self) -> Duration {
        Duration::from_secs(self.callback_timeout_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: Self::DEFAULT_REDIRECT_URI.to_string(),
            scopes: vec!["profile".to_string(), "email".to_string()],
            response_type: "token".to_string(),
            auth_url: Self::DEFAULT_AUTH_URL.to_string(),
            userinfo_url: Self::DEFAULT_USERINFO_URL.to_string(),
            callback_timeout_secs: Self::DEFAULT_CALLBACK_TIMEOUT_SECS,
            request_timeout_secs: 0,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client and endpoint settings.
    pub oauth: OAuthConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies `PCARD_CLIENT_ID` / `PCARD_REDIRECT_URI` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary lookup (the environment in production).
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(client_id) = lookup(CLIENT_ID_ENV).filter(|v| !v.trim().is_empty()) {
            self.oauth.client_id = client_id.trim().to_string();
        }
        if let Some(redirect_uri) = lookup(REDIRECT_URI_ENV) {
            self.oauth.redirect_uri = redirect_uri.trim().to_string();
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::write(path, default_config_template())
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Serializes the effective configuration (for `pcard config show`).
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

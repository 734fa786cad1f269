//! Local browser callback for the implicit grant.
//!
//! The provider redirects to `redirect_uri#access_token=...`. Browsers never
//! send the fragment to the server, so the first hit on the callback path is
//! answered with a tiny page that forwards `location.hash` to
//! `<callback path>/token?<fragment>`. The second hit carries the
//! parameters and ends the wait.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::OAuthConfig;
use crate::oauth::{AuthRequest, AuthResponse, Authenticator, parse_redirect};

/// Set to skip opening the system browser (tests, headless shells).
pub const NO_BROWSER_ENV: &str = "PCARD_NO_BROWSER";

const TOKEN_SUFFIX: &str = "/token";
const MAX_REQUEST_HEAD: usize = 8 * 1024;
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection with its request target, `None` if the read timed out.
type PendingRead = (TcpStream, SocketAddr, Option<io::Result<Option<String>>>);

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Invalid redirect URI '{uri}': {source}")]
    InvalidRedirect {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Redirect URI must look like http://host:port/path, got '{0}'")]
    UnsupportedRedirect(String),

    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Callback connection failed: {0}")]
    Io(#[from] io::Error),
}

/// Listener bound to the redirect URI's host and port.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    /// Binds to the host/port of `redirect_uri`.
    ///
    /// # Errors
    /// Returns an error if the URI is not a plain `http` URL or the port is taken.
    pub async fn bind(redirect_uri: &str) -> Result<Self, CallbackError> {
        let url = url::Url::parse(redirect_uri).map_err(|source| CallbackError::InvalidRedirect {
            uri: redirect_uri.to_string(),
            source,
        })?;
        if url.scheme() != "http" {
            return Err(CallbackError::UnsupportedRedirect(redirect_uri.to_string()));
        }
        let host = match url.host_str() {
            Some("localhost") => "127.0.0.1",
            Some(host) => host.trim_start_matches('[').trim_end_matches(']'),
            None => return Err(CallbackError::UnsupportedRedirect(redirect_uri.to_string())),
        };
        let port = url.port_or_known_default().unwrap_or(80);

        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|source| CallbackError::Bind {
                addr: addr.clone(),
                source,
            })?;
        debug!(%addr, path = url.path(), "callback listener bound");

        Ok(Self {
            listener,
            path: url.path().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the bound address.
    ///
    /// # Errors
    /// Returns an error if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, CallbackError> {
        Ok(self.listener.local_addr()?)
    }

    fn token_path(&self) -> String {
        format!("{}{TOKEN_SUFFIX}", self.path)
    }

    /// Serves requests until one carries the redirect parameters.
    ///
    /// Returns the absolute URL of that request, suitable for
    /// [`parse_redirect`].
    ///
    /// # Errors
    /// Returns an error if accepting a connection fails.
    pub async fn wait_for_redirect(&self) -> Result<String, CallbackError> {
        let addr = self.local_addr()?;
        // Requests are read concurrently so an idle socket (browser
        // preconnect) cannot hold up the real redirect.
        let mut reads: JoinSet<PendingRead> = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (mut stream, peer) = accepted?;
                    reads.spawn(async move {
                        let read = read_request_target(&mut stream);
                        let target = timeout(REQUEST_READ_TIMEOUT, read).await.ok();
                        (stream, peer, target)
                    });
                }
                Some(joined) = reads.join_next() => {
                    let Ok((mut stream, peer, target)) = joined else {
                        continue;
                    };
                    let target = match target {
                        Some(Ok(Some(target))) => target,
                        Some(Ok(None)) => {
                            let _ = respond(&mut stream, &bad_request_response()).await;
                            continue;
                        }
                        Some(Err(err)) => {
                            debug!(%peer, error = %err, "dropping callback connection");
                            continue;
                        }
                        None => {
                            debug!(%peer, "callback connection sent no request in time");
                            continue;
                        }
                    };

                    if let Some(redirect) = self.serve(&mut stream, addr, &target).await {
                        return Ok(redirect);
                    }
                }
            }
        }
    }

    /// Answers one request; returns the redirect URL once it arrives.
    async fn serve(
        &self,
        stream: &mut TcpStream,
        addr: SocketAddr,
        target: &str,
    ) -> Option<String> {
        let Ok(url) = url::Url::parse(&format!("http://{addr}{target}")) else {
            let _ = respond(stream, &bad_request_response()).await;
            return None;
        };
        let path = url.path().trim_end_matches('/');

        if path == self.token_path()
            || (path == self.path && url.query().is_some_and(|q| !q.is_empty()))
        {
            let _ = respond(stream, &login_complete_response()).await;
            return Some(url.to_string());
        }
        if path == self.path {
            let _ = respond(stream, &forward_fragment_response(&self.token_path())).await;
        } else {
            let _ = respond(stream, &not_found_response()).await;
        }
        None
    }
}

/// Opens the system browser and waits for the local callback.
#[derive(Debug, Clone)]
pub struct BrowserAuthenticator {
    timeout: Duration,
    open_browser: bool,
    cancel: CancellationToken,
}

impl BrowserAuthenticator {
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            timeout: config.callback_timeout(),
            open_browser: std::env::var_os(NO_BROWSER_ENV).is_none(),
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to abort the wait (reported as `dismiss`).
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }
}

impl Authenticator for BrowserAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> AuthResponse {
        let Some(redirect_uri) = request.redirect_uri.as_deref() else {
            return AuthResponse::error(
                "no_redirect_uri",
                Some("Browser login needs a redirect_uri to listen on."),
            );
        };

        let listener = match CallbackListener::bind(redirect_uri).await {
            Ok(listener) => listener,
            Err(err) => {
                warn!(error = %err, "cannot start callback listener");
                return AuthResponse::error("callback_unavailable", Some(&err.to_string()));
            }
        };

        if self.open_browser
            && let Err(err) = open::that(&request.url)
        {
            warn!(error = %err, "failed to open browser");
        }
        info!("waiting for browser login callback");

        tokio::select! {
            () = self.cancel.cancelled() => {
                info!("browser login cancelled");
                AuthResponse::dismissed()
            }
            result = timeout(self.timeout, listener.wait_for_redirect()) => match result {
                Ok(Ok(redirect)) => parse_redirect(&redirect, Some(&request.state)),
                Ok(Err(err)) => {
                    warn!(error = %err, "callback listener failed");
                    AuthResponse::error("callback_failed", Some(&err.to_string()))
                }
                Err(_) => {
                    info!(timeout_secs = self.timeout.as_secs(), "browser login timed out");
                    AuthResponse::dismissed()
                }
            },
        }
    }
}

/// Reads the request head and returns the request target (`/path?query`).
async fn read_request_target(stream: &mut TcpStream) -> io::Result<Option<String>> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if buffer.windows(4).any(|w| w == b"\r\n\r\n") || buffer.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    let request = String::from_utf8_lossy(&buffer);
    let Some(request_line) = request.lines().next() else {
        return Ok(None);
    };
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };
    Ok(target.starts_with('/').then(|| target.to_string()))
}

async fn respond(stream: &mut TcpStream, response: &str) -> io::Result<()> {
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn html_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn forward_fragment_response(token_path: &str) -> String {
    let body = format!(
        "<html><body><p>Finishing login...</p><script>\
         window.location.replace('{token_path}?' + window.location.hash.substring(1));\
         </script></body></html>"
    );
    html_response("200 OK", &body)
}

fn login_complete_response() -> String {
    html_response(
        "200 OK",
        "<html><body><h3>Login complete</h3><p>You can close this window.</p></body></html>",
    )
}

fn bad_request_response() -> String {
    html_response("400 Bad Request", "<html><body><h3>Bad request</h3></body></html>")
}

fn not_found_response() -> String {
    html_response("404 Not Found", "<html><body><h3>Not found</h3></body></html>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::AuthResultType;

    #[tokio::test]
    async fn test_fragment_is_forwarded_then_captured() {
        let listener = CallbackListener::bind("http://127.0.0.1:0/callback")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let waiter = tokio::spawn(async move { listener.wait_for_redirect().await });

        let page = reqwest::get(format!("http://{addr}/callback"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(page.contains("location.hash"));
        assert!(page.contains("/callback/token?"));

        let missing = reqwest::get(format!("http://{addr}/favicon.ico"))
            .await
            .unwrap();
        assert_eq!(missing.status().as_u16(), 404);

        let done = reqwest::get(format!(
            "http://{addr}/callback/token?access_token=abc123&state=s1"
        ))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
        assert!(done.contains("Login complete"));

        let redirect = waiter.await.unwrap().unwrap();
        let response = parse_redirect(&redirect, Some("s1"));
        assert_eq!(response.access_token(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_query_on_callback_path_ends_wait() {
        let listener = CallbackListener::bind("http://localhost:0/callback")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let waiter = tokio::spawn(async move { listener.wait_for_redirect().await });

        reqwest::get(format!("http://{addr}/callback?error=access_denied"))
            .await
            .unwrap();

        let redirect = waiter.await.unwrap().unwrap();
        assert_eq!(parse_redirect(&redirect, None).kind, AuthResultType::Cancel);
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        let listener = CallbackListener::bind("http://127.0.0.1:0/callback")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        let waiter = tokio::spawn(async move { listener.wait_for_redirect().await });

        // Connects but never sends a request.
        let _idle = TcpStream::connect(addr).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        let done = client
            .get(format!("http://{addr}/callback/token?access_token=abc123"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(done.contains("Login complete"));

        let redirect = timeout(Duration::from_secs(3), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(parse_redirect(&redirect, None).access_token(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_https_redirect_is_rejected() {
        let err = CallbackListener::bind("https://example.com/callback")
            .await
            .unwrap_err();
        assert!(matches!(err, CallbackError::UnsupportedRedirect(_)));
    }

    #[tokio::test]
    async fn test_browser_login_times_out_as_dismiss() {
        let config = OAuthConfig {
            redirect_uri: "http://127.0.0.1:0/callback".to_string(),
            ..OAuthConfig::default()
        };
        let request = AuthRequest::new(&config);
        let response = BrowserAuthenticator::new(&config)
            .without_browser()
            .with_timeout(Duration::from_millis(50))
            .authenticate(&request)
            .await;
        assert_eq!(response.kind, AuthResultType::Dismiss);
    }

    #[tokio::test]
    async fn test_browser_login_cancel_is_dismiss() {
        let config = OAuthConfig {
            redirect_uri: "http://127.0.0.1:0/callback".to_string(),
            ..OAuthConfig::default()
        };
        let request = AuthRequest::new(&config);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let response = BrowserAuthenticator::new(&config)
            .without_browser()
            .with_cancel(cancel)
            .authenticate(&request)
            .await;
        assert_eq!(response.kind, AuthResultType::Dismiss);
    }

    #[tokio::test]
    async fn test_browser_login_without_redirect_is_error() {
        let config = OAuthConfig {
            redirect_uri: String::new(),
            ..OAuthConfig::default()
        };
        let response = BrowserAuthenticator::new(&config)
            .without_browser()
            .authenticate(&AuthRequest::new(&config))
            .await;
        assert_eq!(response.kind, AuthResultType::Error);
        assert_eq!(response.params["error"], "no_redirect_uri");
    }
}

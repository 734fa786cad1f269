//! `pcard login` with the redirect pasted on stdin.


use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{mount_userinfo, pcard_home_for};
use predicates::prelude::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_with_pasted_redirect() {
    let server = MockServer::start().await;
    mount_userinfo(&server, "abc123", 1).await;
    let home = pcard_home_for(&server);

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env("PCARD_NO_BROWSER", "1")
        .env("PCARD_CLIENT_ID", "client-123.apps.googleusercontent.com")
        .arg("login")
        .write_stdin("http://127.0.0.1:8765/callback#access_token=abc123&token_type=Bearer\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("client_id=client-123.apps.googleusercontent.com"))
        .stdout(predicate::str::contains("response_type=token"))
        .stdout(predicate::str::contains("scope=profile+email"))
        .stdout(predicate::str::contains("Logged in"))
        .stdout(predicate::str::contains("Profile: Ana Silva"))
        .stdout(predicate::str::contains("abc123").not());
}

#[tokio::test]
async fn test_login_denied_fetches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let home = pcard_home_for(&server);

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env("PCARD_NO_BROWSER", "1")
        .env("PCARD_CLIENT_ID", "client-123")
        .arg("login")
        .write_stdin("http://127.0.0.1:8765/callback#error=access_denied\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login was cancelled."));
}

#[tokio::test]
async fn test_login_empty_paste_is_dismissed() {
    let server = MockServer::start().await;
    let home = pcard_home_for(&server);

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env("PCARD_NO_BROWSER", "1")
        .env("PCARD_CLIENT_ID", "client-123")
        .arg("login")
        .write_stdin("\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Login was dismissed."));
}

#[test]
fn test_login_without_client_id_fails() {
    let home = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env_remove("PCARD_CLIENT_ID")
        .arg("login")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No OAuth client id configured"));
}

#[test]
fn test_no_redirect_uri_flag_omits_parameter() {
    let home = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env("PCARD_NO_BROWSER", "1")
        .args(["--client-id", "client-123", "--no-redirect-uri", "login"])
        .write_stdin("\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("redirect_uri").not());
}

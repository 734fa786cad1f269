//! `pcard profile` against a mocked userinfo endpoint.


use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::{mount_userinfo, pcard_home_for};
use predicates::prelude::*;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_profile_prints_card() {
    let server = MockServer::start().await;
    mount_userinfo(&server, "abc123", 1).await;
    let home = pcard_home_for(&server);

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .args(["profile", "--token", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile: Ana Silva"))
        .stdout(predicate::str::contains("ana@example.com"))
        .stdout(predicate::str::contains("pt-BR"))
        .stdout(predicate::str::contains("https://x/y.png"));
}

#[tokio::test]
async fn test_profile_json_from_env_token() {
    let server = MockServer::start().await;
    mount_userinfo(&server, "env-token", 1).await;
    let home = pcard_home_for(&server);

    let output = cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .env("PCARD_ACCESS_TOKEN", "env-token")
        .args(["profile", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let profile: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(profile["given_name"], "Ana");
    assert_eq!(profile["family_name"], "Silva");
    // Printed as received, provider-only fields included.
    assert_eq!(profile["id"], "1234567890");
}

#[tokio::test]
async fn test_profile_rejected_token_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .expect(1)
        .mount(&server)
        .await;
    let home = pcard_home_for(&server);

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", home.path())
        .args(["profile", "--token", "expired"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HTTP 401"));
}

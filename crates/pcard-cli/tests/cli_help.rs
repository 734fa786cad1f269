use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("pcard")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--client-id"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("pcard")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("show"));
}

#[test]
fn test_profile_requires_token() {
    let dir = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .env_remove("PCARD_ACCESS_TOKEN")
        .arg("profile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--token"));
}

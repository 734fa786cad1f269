use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("[oauth]"));
    assert!(contents.contains("response_type = \"token\""));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_path_works_with_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[oauth").unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();
}

#[test]
fn test_config_show_merges_env_and_flags() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[oauth]\nclient_id = \"from-file\"\nscopes = [\"profile\"]\n",
    )
    .unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .env("PCARD_CLIENT_ID", "from-env")
        .env_remove("PCARD_REDIRECT_URI")
        .args(["--redirect-uri", "http://localhost:9000/cb", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("client_id = \"from-env\""))
        .stdout(predicate::str::contains("redirect_uri = \"http://localhost:9000/cb\""))
        .stdout(predicate::str::contains("\"profile\""));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "[oauth").unwrap();

    cargo_bin_cmd!("pcard")
        .env("PCARD_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

//! Integration tests for the envstrap CLI surface.

use assert_cmd::Command;
use predicates::prelude::*;

fn envstrap() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("envstrap"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_help_flag_shows_help() {
    envstrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Provision an isolated runtime environment"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    envstrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("envstrap"));
}

#[test]
fn test_version_command_shows_version() {
    envstrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!("envstrap ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = envstrap()
        .args(["version", "--json"])
        .output()
        .unwrap_or_else(|e| panic!("run envstrap: {e}"));
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("invalid json: {e}"));
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_run_help_lists_flags() {
    envstrap()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--fail-fast"))
        .stdout(predicate::str::contains("--recreate"))
        .stdout(predicate::str::contains("--log-file"));
}

#[test]
fn test_unknown_command_is_rejected() {
    envstrap().arg("frobnicate").assert().code(2);
}

#[test]
fn test_no_color_env_accepts_any_value() {
    for value in ["1", "", "true", "yes"] {
        envstrap()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stdout(predicate::str::contains("envstrap"));
    }
}

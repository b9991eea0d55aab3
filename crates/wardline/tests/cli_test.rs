//! Integration tests for the `wardline` CLI binary.
//!
//! These validate argument parsing, help output, and configuration
//! error handling -- all without requiring a live roster service.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `wardline` binary with env isolation.
///
/// Clears all `WARDLINE_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn wardline_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wardline");
    cmd.env("HOME", "/tmp/wardline-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/wardline-cli-test-nonexistent")
        .env_remove("WARDLINE_PROFILE")
        .env_remove("WARDLINE_API_URL")
        .env_remove("WARDLINE_HUB_URL")
        .env_remove("WARDLINE_TOKEN")
        .env_remove("WARDLINE_LOCALE")
        .env_remove("WARDLINE_OUTPUT")
        .env_remove("WARDLINE_INSECURE")
        .env_remove("WARDLINE_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let output = wardline_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_commands() {
    wardline_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("watch")
            .and(predicate::str::contains("list"))
            .and(predicate::str::contains("unread"))
            .and(predicate::str::contains("mark-read"))
            .and(predicate::str::contains("delete"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn version_flag() {
    wardline_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wardline"));
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = wardline_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn mark_read_requires_ids_or_all() {
    let output = wardline_cmd().arg("mark-read").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn delete_requires_ids() {
    let output = wardline_cmd().arg("delete").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn list_rejects_conflicting_read_filters() {
    let output = wardline_cmd()
        .args(["list", "--unread", "--read"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_locale_is_rejected() {
    let output = wardline_cmd()
        .args(["--locale", "fr", "unread"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("locale"), "Expected locale error:\n{text}");
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn unread_without_config_explains_setup() {
    let output = wardline_cmd().arg("unread").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config init") || text.contains("WARDLINE_API_URL"),
        "Expected setup guidance:\n{text}"
    );
}

#[test]
fn unknown_profile_lists_alternatives() {
    let output = wardline_cmd()
        .args(["--profile", "nope", "unread"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("nope"),
        "Expected the profile name in output:\n{text}"
    );
}

#[test]
fn invalid_api_url_is_usage_error() {
    let output = wardline_cmd()
        .args(["--api-url", "not a url", "unread"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("invalid URL"), "Expected URL error:\n{text}");
}

// ── Non-interactive confirmation ────────────────────────────────────

#[test]
fn delete_without_tty_requires_yes() {
    // With stdin piped there is no terminal to answer the prompt; the
    // command must refuse before touching the network.
    let output = wardline_cmd()
        .env("WARDLINE_API_URL", "http://127.0.0.1:9")
        .args(["delete", "3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--yes"), "Expected --yes guidance:\n{text}");
}

// ── Config path ─────────────────────────────────────────────────────

#[test]
fn config_path_prints_toml_location() {
    wardline_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

//! Integration tests for the `vlanshift` CLI binary.
//!
//! These cover argument parsing, help output, shell completions, config
//! handling and the early input checks, all without a reachable switch.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `vlanshift` binary with env isolation.
///
/// Clears all `VLANSHIFT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn vlanshift_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("vlanshift");
    cmd.env("HOME", "/tmp/vlanshift-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/vlanshift-cli-test-nonexistent")
        .env_remove("VLANSHIFT_PROFILE")
        .env_remove("VLANSHIFT_USERNAME")
        .env_remove("VLANSHIFT_PASSWORD")
        .env_remove("VLANSHIFT_PORT")
        .env_remove("VLANSHIFT_TIMEOUT")
        .env_remove("VLANSHIFT_OUTPUT")
        .env_remove("VLANSHIFT_INPUT")
        .env_remove("VLANSHIFT_CORE")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`vlanshift_cmd`] with credentials supplied through the env.
fn vlanshift_cmd_with_credentials() -> assert_cmd::Command {
    let mut cmd = vlanshift_cmd();
    cmd.env("VLANSHIFT_USERNAME", "netops")
        .env("VLANSHIFT_PASSWORD", "secret");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = vlanshift_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    vlanshift_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("access VLAN")
            .and(predicate::str::contains("run"))
            .and(predicate::str::contains("locate"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    vlanshift_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("vlanshift"));
}

#[test]
fn test_run_help_lists_flags() {
    vlanshift_cmd().args(["run", "--help"]).assert().success().stdout(
        predicate::str::contains("--vlan")
            .and(predicate::str::contains("--dry-run"))
            .and(predicate::str::contains("--output-file")),
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    vlanshift_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vlanshift"));
}

#[test]
fn test_completions_zsh() {
    vlanshift_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_fish() {
    vlanshift_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    vlanshift_cmd()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_output_format() {
    vlanshift_cmd()
        .args(["--output", "xml", "config", "show"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_vlan_out_of_range_rejected() {
    vlanshift_cmd()
        .args(["run", "--vlan", "5000"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("5000"));
}

#[test]
fn test_vlan_zero_rejected() {
    vlanshift_cmd()
        .args(["run", "--vlan", "0"])
        .assert()
        .failure()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    vlanshift_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]").and(predicate::str::contains("port = 22")));
}

#[test]
fn test_config_show_json() {
    let output = vlanshift_cmd()
        .args(["--output", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["defaults"]["timeout"], 30);
}

#[test]
fn test_config_path() {
    vlanshift_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_use_unknown_profile() {
    vlanshift_cmd()
        .args(["config", "use", "campus"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("campus"));
}

// ── Early input checks ──────────────────────────────────────────────

#[test]
fn test_missing_credentials_without_terminal() {
    vlanshift_cmd()
        .args(["locate", "--core", "10.0.0.1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--username"));
}

#[test]
fn test_missing_input_file() {
    vlanshift_cmd_with_credentials()
        .args([
            "locate",
            "--core",
            "10.0.0.1",
            "--input",
            "/tmp/vlanshift-cli-test-nonexistent/macs.csv",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("macs.csv"));
}

#[test]
fn test_input_without_valid_macs_stops_before_connecting() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "not-a-mac").unwrap();
    writeln!(file, "00:11:22:33:44").unwrap();

    vlanshift_cmd_with_credentials()
        .args(["locate", "--core", "192.0.2.1", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stderr(
            predicate::str::contains("appears to be an invalid MAC address")
                .and(predicate::str::contains("No valid MAC addresses")),
        );
}

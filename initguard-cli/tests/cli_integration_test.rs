//! Integration tests for the initguard binary

use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

const TOKEN_VAR: &str = "INITGUARD_CLI_TEST_TOKEN";
const TOKEN: &str = "123456:TEST-golden-vector-token";

const GOLDEN_INIT_DATA: &str = "auth_date=1700000000&query_id=AAH\
    &user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D\
    &hash=4db812310efe48e73aee42ddc3477a5be270584dfbcb5ab367fc4cd7b38294c3";

/// Write a config that points at the test token variable
fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("initguard.json");
    fs::write(&path, format!(r#"{{"bot_token_env": "{TOKEN_VAR}"}}"#)).unwrap();
    path
}

/// Helper to run initguard with the test token in its environment
fn run_initguard(config: &Path, args: &[&str], token: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_initguard"));
    cmd.arg("--config").arg(config).args(args).env_remove(TOKEN_VAR);
    if let Some(token) = token {
        cmd.env(TOKEN_VAR, token);
    }
    cmd.output().expect("Failed to run initguard")
}

#[test]
fn test_verify_golden_payload() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(
        &config,
        &["verify", "--init-data", GOLDEN_INIT_DATA, "--now", "1700000060", "--json"],
        Some(TOKEN),
    );

    assert!(
        output.status.success(),
        "verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let verdict: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["authentic"], true);
    assert_eq!(verdict["fresh"], true);
    assert!(verdict.get("reason").is_none());
}

#[test]
fn test_verify_stale_payload_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(
        &config,
        &["verify", "--init-data", GOLDEN_INIT_DATA, "--now", "1700000601", "--json"],
        Some(TOKEN),
    );

    assert_eq!(output.status.code(), Some(1));
    let verdict: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["authentic"], true);
    assert_eq!(verdict["fresh"], false);
}

#[test]
fn test_verify_malformed_payload() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(
        &config,
        &["verify", "--init-data", "auth_date=1700000000&query_id=AAH"],
        Some(TOKEN),
    );

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hash"), "stdout: {stdout}");
}

#[test]
fn test_verify_without_token_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(&config, &["verify", "--init-data", GOLDEN_INIT_DATA], None);

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty(), "no verdict without a token");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(TOKEN_VAR), "stderr: {stderr}");
}

#[test]
fn test_missing_token_is_distinct_from_untrusted() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());
    let args = ["verify", "--init-data", GOLDEN_INIT_DATA, "--now", "1700000601"];

    let stale = run_initguard(&config, &args, Some(TOKEN));
    let no_token = run_initguard(&config, &args, None);

    assert_eq!(stale.status.code(), Some(1));
    assert_eq!(no_token.status.code(), Some(3));
}

#[test]
fn test_sign_without_token_is_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(&config, &["sign", "--field", "query_id=AAH"], None);

    assert_eq!(output.status.code(), Some(3));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(TOKEN_VAR), "stderr: {stderr}");
}

#[test]
fn test_sign_rejects_duplicate_fields() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(
        &config,
        &["sign", "--field", "query_id=A", "--field", "query_id=B", "--auth-date", "1"],
        Some(TOKEN),
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty(), "nothing signed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("query_id"), "stderr: {stderr}");
}

#[test]
fn test_verify_reads_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let mut child = Command::new(env!("CARGO_BIN_EXE_initguard"))
        .arg("--config")
        .arg(&config)
        .args(["verify", "--now", "1700000001", "--json"])
        .env(TOKEN_VAR, TOKEN)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn initguard");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(format!("{GOLDEN_INIT_DATA}\n").as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let verdict: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["authentic"], true);
}

#[test]
fn test_check_string_needs_no_token() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let output = run_initguard(&config, &["check-string", "--init-data", GOLDEN_INIT_DATA], None);

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "auth_date=1700000000\nquery_id=AAH\nuser={\"id\":1,\"first_name\":\"A\"}"
    );
}

#[test]
fn test_sign_then_verify() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(temp_dir.path());

    let signed = run_initguard(
        &config,
        &[
            "sign",
            "--field",
            "query_id=AAH",
            "--field",
            r#"user={"id":1,"first_name":"A"}"#,
            "--auth-date",
            "1700000000",
        ],
        Some(TOKEN),
    );
    assert!(signed.status.success());
    let init_data = String::from_utf8(signed.stdout).unwrap();
    assert!(init_data.trim_end().ends_with(
        "hash=4db812310efe48e73aee42ddc3477a5be270584dfbcb5ab367fc4cd7b38294c3"
    ));

    let verified = run_initguard(
        &config,
        &["verify", "--init-data", init_data.trim(), "--now", "1700000010"],
        Some(TOKEN),
    );
    assert!(verified.status.success());
}

// crates/tessera-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests driving the `tessera` binary.
// Purpose: Ensure exit codes, output streams, and redaction hold end to end.
// Dependencies: tessera-cli binary, tempfile
// ============================================================================
//! ## Overview
//! Runs each subcommand against files in a temporary directory.
//!
//! Security posture: secret values must never reach stdout or stderr
//! unmasked, including in error output.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;
use tempfile::tempdir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

const APP: &str = "id: demo\nidentity:\n  oauth:\n    providers:\n      - { alias: google, type: google }\n";

const SECRETS: &str = r"
secrets:
  - key: db
    data: { database_url: 'postgres://app:db-hunter2@db/app' }
  - key: redis
    data: { redis_url: 'redis://cache:6379' }
  - key: admin-api.auth
    data:
      keys:
        - { kid: admin-seed, kty: oct, k: YWRtaW4tc2VlZC1rZXk }
  - key: sso.oauth.client
    data:
      items:
        - { alias: google, client_secret: google-hunter2 }
";

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn tessera_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tessera"))
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = tempdir().expect("create temp dir");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write fixture");
    }
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(tessera_bin()).current_dir(dir).args(args).output().expect("run tessera")
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn validate_accepts_a_complete_pair() {
    let dir = workspace(&[("app.yaml", APP), ("secrets.yaml", SECRETS)]);
    let output = run(dir.path(), &["validate", "--app", "app.yaml", "--secrets", "secrets.yaml"]);
    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    assert_eq!(text(&output.stdout), "app config and secrets are valid (4 secrets)\n");
}

#[test]
fn validate_reports_missing_provider_secret() {
    let secrets = SECRETS.split("  - key: sso.oauth.client").next().unwrap();
    let dir = workspace(&[("app.yaml", APP), ("secrets.yaml", secrets)]);
    let output = run(dir.path(), &["validate", "--app", "app.yaml", "--secrets", "secrets.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = text(&output.stderr);
    assert!(stderr.contains("OAuth client credentials for 'google' is required"), "stderr: {stderr}");
}

#[test]
fn decode_errors_are_redacted() {
    let broken = SECRETS.replace("redis_url: 'redis://cache:6379'", "redis_url: ['redis-hunter2']");
    let dir = workspace(&[("secrets.yaml", broken.as_str()), ("app.yaml", APP)]);
    let output = run(dir.path(), &["validate", "--app", "app.yaml", "--secrets", "secrets.yaml"]);
    assert!(!output.status.success());
    let stderr = text(&output.stderr);
    assert!(!stderr.contains("hunter2"), "stderr leaked a secret: {stderr}");
}

#[test]
fn secrets_apply_writes_snapshot_and_masked_diff() {
    let instruction = "oauthSSOProviderClientSecrets:\n  action: set\n  data:\n    - { originalAlias: google, newAlias: google, newClientSecret: rotated-hunter2 }\n";
    let dir = workspace(&[("secrets.yaml", SECRETS), ("instruction.yaml", instruction)]);
    let output = run(
        dir.path(),
        &["secrets", "apply", "--secrets", "secrets.yaml", "--instruction", "instruction.yaml", "--out", "next.yaml"],
    );
    assert!(output.status.success(), "stderr: {}", text(&output.stderr));
    let stderr = text(&output.stderr);
    assert!(stderr.contains("client_secret"), "diff missing: {stderr}");
    assert!(!stderr.contains("hunter2"), "stderr leaked a secret: {stderr}");
    assert!(output.stdout.is_empty());

    let written = fs::read_to_string(dir.path().join("next.yaml")).unwrap();
    assert!(written.contains("rotated-hunter2"));
    let check = run(dir.path(), &["diff", "--kind", "secrets", "--original", "secrets.yaml", "--updated", "next.yaml"]);
    assert_eq!(check.status.code(), Some(1));
    assert!(!text(&check.stdout).contains("hunter2"));
}

#[test]
fn secrets_apply_rejects_unknown_instruction_fields() {
    let dir = workspace(&[("secrets.yaml", SECRETS), ("instruction.yaml", "rotateEverything: true\n")]);
    let output = run(dir.path(), &["secrets", "apply", "--secrets", "secrets.yaml", "--instruction", "instruction.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(text(&output.stderr).contains("instruction.yaml"));
}

#[test]
fn diff_exit_code_tracks_changes() {
    let updated = format!("{APP}oauth:\n  clients:\n    - {{ client_id: portal }}\n");
    let dir = workspace(&[("a.yaml", APP), ("b.yaml", updated.as_str())]);

    let same = run(dir.path(), &["diff", "--original", "a.yaml", "--updated", "a.yaml"]);
    assert_eq!(same.status.code(), Some(0));
    assert!(same.stdout.is_empty());

    let changed = run(dir.path(), &["diff", "--original", "a.yaml", "--updated", "b.yaml"]);
    assert_eq!(changed.status.code(), Some(1));
    let report = text(&changed.stdout);
    assert!(report.starts_with("+ oauth: "), "report: {report}");
}

#[test]
fn schema_prints_documents_and_fragments() {
    let dir = workspace(&[]);
    let document = run(dir.path(), &["schema"]);
    assert!(document.status.success());
    let value: serde_json::Value = serde_json::from_slice(&document.stdout).unwrap();
    assert_eq!(value["$ref"], "#/$defs/AppConfig");

    let fragment = run(dir.path(), &["schema", "--kind", "secrets", "--part", "JWK"]);
    let value: serde_json::Value = serde_json::from_slice(&fragment.stdout).unwrap();
    assert_eq!(value["required"], serde_json::json!(["kid", "kty"]));

    let unknown = run(dir.path(), &["schema", "--part", "NoSuchPart"]);
    assert_eq!(unknown.status.code(), Some(2));
    assert!(text(&unknown.stderr).contains("unknown schema part 'NoSuchPart'"));
}

#[test]
fn oversized_inputs_fail_closed() {
    let large = format!("id: demo\n# {}\n", "x".repeat(1024 * 1024));
    let dir = workspace(&[("app.yaml", large.as_str())]);
    let output = run(dir.path(), &["validate", "--app", "app.yaml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(text(&output.stderr).contains("is too large"));
}

// crates/tessera-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and bounded file reads.
// Purpose: Ensure oversized inputs fail closed and flags parse as documented.
// Dependencies: tessera-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Validates `read_bytes_with_limit`, the file writer, and the clap surface.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::missing_docs_in_private_items,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use clap::Parser;
use tempfile::tempdir;

use super::Cli;
use super::Commands;
use super::DocumentKind;
use super::ReadLimitError;
use super::SecretsCommand;
use super::read_bytes_with_limit;
use super::read_text;
use super::write_file_atomic;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn read_bytes_with_limit_accepts_files_at_the_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exact.yaml");
    fs::write(&path, b"id: ok").unwrap();
    assert_eq!(read_bytes_with_limit(&path, 6).unwrap(), b"id: ok");
}

#[test]
fn read_bytes_with_limit_rejects_oversized_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("large.yaml");
    fs::write(&path, vec![b'a'; 32]).unwrap();
    match read_bytes_with_limit(&path, 8) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 32);
            assert_eq!(limit, 8);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn read_text_reports_missing_files_with_their_kind() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.yaml");
    let err = read_text(&path, "app config").unwrap_err();
    assert!(err.to_string().starts_with("failed to read app config at "));
}

#[test]
fn read_text_rejects_invalid_utf8() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary.yaml");
    fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
    let err = read_text(&path, "secret config").unwrap_err();
    assert!(err.to_string().ends_with("is not valid UTF-8"));
}

#[test]
fn write_file_atomic_replaces_contents_and_leaves_no_temp_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("secrets.yaml");
    write_file_atomic(&path, "first\n").unwrap();
    write_file_atomic(&path, "second\n").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn diff_kind_defaults_to_app() {
    let cli = Cli::try_parse_from(["tessera", "diff", "--original", "a.yaml", "--updated", "b.yaml"]).unwrap();
    match cli.command {
        Some(Commands::Diff(command)) => assert_eq!(command.kind, DocumentKind::App),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn secrets_apply_requires_an_instruction() {
    assert!(Cli::try_parse_from(["tessera", "secrets", "apply", "--secrets", "s.yaml"]).is_err());
    let cli = Cli::try_parse_from([
        "tessera",
        "secrets",
        "apply",
        "--secrets",
        "s.yaml",
        "--instruction",
        "i.yaml",
        "--out",
        "next.yaml",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Secrets {
            command: SecretsCommand::Apply(command),
        }) => assert_eq!(command.out.unwrap().to_string_lossy(), "next.yaml"),
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn schema_kind_accepts_secrets() {
    let cli = Cli::try_parse_from(["tessera", "schema", "--kind", "secrets", "--part", "JWK"]).unwrap();
    match cli.command {
        Some(Commands::Schema(command)) => {
            assert_eq!(command.kind, DocumentKind::Secrets);
            assert_eq!(command.part.as_deref(), Some("JWK"));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

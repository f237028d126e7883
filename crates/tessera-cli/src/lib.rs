// crates/tessera-cli/src/lib.rs
// ============================================================================
// Module: Tessera CLI Library
// Description: Shared helpers for the `tessera` binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! The library half of the CLI crate holds the message catalog used by
//! every command in `main.rs`.

pub mod messages;

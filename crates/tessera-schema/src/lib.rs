// crates/tessera-schema/src/lib.rs
// ============================================================================
// Module: Tessera Schema Library
// Description: Composable JSON Schema registry and structured violations.
// Purpose: Validate configuration documents against fragment-built schemas.
// Dependencies: jsonschema, serde_json, thiserror, tracing, url
// ============================================================================

//! ## Overview
//! `tessera-schema` assembles named JSON Schema fragments into one document
//! schema, compiles it once, and reports every violation with its JSON
//! pointer. Fragments are contributed through a [`SchemaBuilder`] and frozen
//! into a [`SchemaRegistry`]; once frozen, no further fragment can be added.
//!
//! Custom string formats (phone numbers, origins, hook URIs, language tags,
//! durations) are supplied by a [`FormatRegistry`] keyed by format name.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod error;
pub mod formats;
pub mod registry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::SchemaError;
pub use error::ValidationContext;
pub use error::ValidationError;
pub use error::Violation;
pub use error::json_pointer;
pub use formats::FormatChecker;
pub use formats::FormatRegistry;
pub use registry::JSON_SCHEMA_DRAFT;
pub use registry::PartValidator;
pub use registry::SchemaBuilder;
pub use registry::SchemaRegistry;
pub use registry::fragment_ref;

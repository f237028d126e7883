// crates/tessera-config/src/lib.rs
// ============================================================================
// Module: Tessera Config Library
// Description: Configuration and secret lifecycle engine.
// Purpose: Parse, default, validate, patch, and diff configuration snapshots.
// Dependencies: tessera-schema, serde, serde_json, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! `tessera-config` turns YAML documents into immutable, validated snapshots:
//!
//! - [`app`]: the typed application configuration and its schema fragments.
//! - [`defaults`]: the bottom-up, idempotent defaulting engine.
//! - [`secrets`]: the tagged secret store, one payload type per key.
//! - [`validator`]: "feature enabled implies secret present" cross-checks.
//! - [`update`]: declarative secret patches producing new snapshots.
//! - [`diff`]: canonical structural diffs for audit review.
//!
//! [`Config::load`] runs the whole pipeline for an app/secret pair.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod app;
pub mod defaults;
pub mod diff;
pub mod error;
pub mod masking;
pub mod pipeline;
pub mod secrets;
pub mod update;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use app::AppConfig;
pub use app::app_config_schema;
pub use app::parse_app_config;
pub use defaults::NullableFields;
pub use defaults::PopulateDefaults;
pub use defaults::SetDefaults;
pub use defaults::apply_defaults;
pub use diff::ConfigDiff;
pub use diff::ConfigDiffer;
pub use diff::DiffEntry;
pub use diff::DiffKind;
pub use diff::diff_text;
pub use error::ConfigError;
pub use masking::MASK_TOKEN;
pub use masking::MaskPatterns;
pub use pipeline::Config;
pub use secrets::SecretConfig;
pub use secrets::SecretItem;
pub use secrets::SecretKey;
pub use secrets::SecretPayload;
pub use secrets::parse_partial_secret;
pub use secrets::parse_secret_config;
pub use secrets::secret_config_schema;
pub use update::SecretConfigUpdateInstruction;
pub use update::UpdateInstructionApplier;
pub use update::UpdateInstructionContext;
pub use update::parse_update_instruction;
pub use validator::SecretValidator;
pub use validator::SecretViolation;
pub use validator::ViolationPath;

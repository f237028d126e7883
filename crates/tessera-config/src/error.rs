// crates/tessera-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Error taxonomy for parsing, decoding, and patching configuration.
// Purpose: Carry every offending path back to the operator in one value.
// Dependencies: tessera-schema, thiserror
// ============================================================================

//! ## Overview
//! [`ConfigError`] distinguishes the stages a document can fail in: text
//! parsing, schema validation, typed decoding, business rules, and update
//! instruction application. The three document stages carry a
//! [`ValidationError`] so every violation is reported at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tessera_schema::SchemaError;
use tessera_schema::ValidationError;
use tessera_schema::Violation;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration lifecycle errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The input text is not well-formed YAML or JSON.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The document does not conform to its JSON Schema.
    #[error("{0}")]
    Schema(ValidationError),
    /// The document conforms but cannot be converted to typed values.
    #[error("{0}")]
    Decode(ValidationError),
    /// A business rule was violated.
    #[error("{0}")]
    Validation(ValidationError),
    /// An update instruction could not be applied.
    #[error("invalid update instruction: {0}")]
    Instruction(String),
    /// A snapshot could not be serialized.
    #[error("config serialization error: {0}")]
    Serialization(String),
    /// The schema registry could not be built.
    #[error("schema registry error: {0}")]
    Registry(#[from] SchemaError),
}

impl ConfigError {
    /// Returns the violations carried by document-stage errors.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Schema(error) | Self::Decode(error) | Self::Validation(error) => &error.violations,
            Self::Parse(_) | Self::Instruction(_) | Self::Serialization(_) | Self::Registry(_) => &[],
        }
    }

    /// Returns true when a violation exists at exactly `path`.
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        self.violations().iter().any(|violation| violation.path == path)
    }
}

// crates/tessera-schema/src/error.rs
// ============================================================================
// Module: Schema Errors
// Description: Registry errors and aggregated validation violations.
// Purpose: Report every offending path of a document in one error value.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ValidationError`] carries a headline plus every [`Violation`] found in
//! a document. Its rendering is one multi-line message so an operator sees
//! all problems of a submission at once. [`ValidationContext`] accumulates
//! violations from business-rule checks that run after schema validation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Registry Errors
// ============================================================================

/// Errors raised while assembling or compiling a schema registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A fragment with the same name was already registered.
    #[error("schema fragment already registered: {0}")]
    DuplicateFragment(String),
    /// A fragment name was requested that the registry does not hold.
    #[error("unknown schema fragment: {0}")]
    UnknownFragment(String),
    /// The assembled document failed to compile.
    #[error("schema compilation failed: {0}")]
    Compile(String),
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// A single validation failure located by JSON pointer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Violation {
    /// JSON pointer of the offending value; empty for the document root.
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl Violation {
    /// Creates a violation at the given pointer.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Aggregated violations produced by one validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    /// Headline describing what was being validated.
    pub message: String,
    /// Every violation found, in deterministic order.
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Creates an aggregate error from a headline and its violations.
    #[must_use]
    pub fn new(message: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            message: message.into(),
            violations,
        }
    }

    /// Returns true when a violation exists at exactly `path`.
    #[must_use]
    pub fn has_path(&self, path: &str) -> bool {
        self.violations.iter().any(|violation| violation.path == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.message)?;
        for violation in &self.violations {
            write!(f, "\n{violation}")?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Validation Context
// ============================================================================

/// Accumulates violations from rule checks without failing fast.
#[derive(Debug, Default, Clone)]
pub struct ValidationContext {
    /// Violations recorded so far, in emission order.
    violations: Vec<Violation>,
}

impl ValidationContext {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Records a violation at `path`.
    pub fn emit(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    /// Records every violation of a nested validation error.
    pub fn absorb(&mut self, error: ValidationError) {
        self.violations.extend(error.violations);
    }

    /// Returns true when no violation has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the recorded violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the context and returns the recorded violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Converts the context into a result using `headline` for failures.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when at least one violation was recorded.
    pub fn finish(self, headline: &str) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(headline, self.violations))
        }
    }
}

// ============================================================================
// SECTION: JSON Pointers
// ============================================================================

/// Builds a JSON pointer from path segments, escaping `~` and `/`.
#[must_use]
pub fn json_pointer<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut pointer = String::new();
    for segment in segments {
        pointer.push('/');
        pointer.push_str(&segment.as_ref().replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

// ============================================================================
// SECTION: Tests
// ============================================================================

// crates/tessera-schema/src/registry.rs
// ============================================================================
// Module: Schema Registry
// Description: Builder and frozen registry for fragment-composed schemas.
// Purpose: Compile one document schema from independently contributed parts.
// Dependencies: jsonschema, serde_json, tracing
// ============================================================================

//! ## Overview
//! Modules contribute named fragments to a [`SchemaBuilder`]. Fragments refer
//! to one another with `{"$ref": "#/$defs/<Name>"}`. [`SchemaBuilder::instantiate`]
//! consumes the builder, assembles
//! `{"$schema", "$ref": "#/$defs/<root>", "$defs": {..}}`, and compiles it;
//! an unresolvable reference fails there rather than at first use. The
//! resulting [`SchemaRegistry`] is immutable and can be shared across threads.
//!
//! [`SchemaRegistry::part_validator`] compiles the same fragment set rooted at
//! a single fragment, which lets sub-schemas be exercised in isolation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::error::SchemaError;
use crate::error::ValidationError;
use crate::error::Violation;
use crate::formats::FormatChecker;
use crate::formats::FormatRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Dialect identifier written into every assembled document.
pub const JSON_SCHEMA_DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Headline used when no caller-specific headline is supplied.
const DEFAULT_HEADLINE: &str = "invalid document";

/// Returns a `$ref` pointing at the named fragment.
#[must_use]
pub fn fragment_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/$defs/{name}") })
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Accumulates fragments before the registry is frozen.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    /// Fragment validated at the document root.
    root: String,
    /// Registered fragments keyed by name.
    fragments: BTreeMap<String, Value>,
    /// Format checkers installed at compile time.
    formats: FormatRegistry,
}

impl SchemaBuilder {
    /// Creates a builder whose document root is the fragment `root`.
    ///
    /// The built-in format checkers are installed by default.
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            fragments: BTreeMap::new(),
            formats: FormatRegistry::with_defaults(),
        }
    }

    /// Replaces the format registry used at compile time.
    #[must_use]
    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    /// Registers a named fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateFragment`] when `name` is taken.
    pub fn add(&mut self, name: impl Into<String>, fragment: Value) -> Result<(), SchemaError> {
        let name = name.into();
        if self.fragments.contains_key(&name) {
            return Err(SchemaError::DuplicateFragment(name));
        }
        self.fragments.insert(name, fragment);
        Ok(())
    }

    /// Registers or replaces a format checker.
    pub fn add_format(&mut self, name: impl Into<String>, checker: FormatChecker) {
        self.formats.insert(name, checker);
    }

    /// Returns true when a fragment named `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    /// Freezes the builder into a compiled registry.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownFragment`] when the root fragment is
    /// missing and [`SchemaError::Compile`] when a reference cannot be
    /// resolved or a fragment is not a valid schema.
    pub fn instantiate(self) -> Result<SchemaRegistry, SchemaError> {
        if !self.fragments.contains_key(&self.root) {
            return Err(SchemaError::UnknownFragment(self.root));
        }
        let document = assemble(&self.root, &self.fragments);
        let validator = compile(&document, &self.formats)?;
        tracing::debug!(root = %self.root, fragments = self.fragments.len(), "schema registry instantiated");
        Ok(SchemaRegistry {
            root: self.root,
            fragments: self.fragments,
            formats: self.formats,
            document,
            validator,
        })
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Frozen, compiled document schema.
pub struct SchemaRegistry {
    /// Root fragment name.
    root: String,
    /// All fragments keyed by name.
    fragments: BTreeMap<String, Value>,
    /// Format checkers used for part validators.
    formats: FormatRegistry,
    /// Assembled document schema.
    document: Value,
    /// Compiled validator for the document root.
    validator: Validator,
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("root", &self.root)
            .field("fragments", &self.fragments.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SchemaRegistry {
    /// Returns the root fragment name.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns the assembled document schema.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.document
    }

    /// Returns a registered fragment.
    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&Value> {
        self.fragments.get(name)
    }

    /// Lists fragment names in sorted order.
    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.fragments.keys().map(String::as_str)
    }

    /// Validates a whole document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        self.validate_with_message(instance, DEFAULT_HEADLINE)
    }

    /// Validates a whole document, using `headline` on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violation.
    pub fn validate_with_message(&self, instance: &Value, headline: &str) -> Result<(), ValidationError> {
        collect(&self.validator, instance, headline)
    }

    /// Compiles a validator rooted at the named fragment.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownFragment`] for an unregistered name.
    pub fn part_validator(&self, name: &str) -> Result<PartValidator, SchemaError> {
        if !self.fragments.contains_key(name) {
            return Err(SchemaError::UnknownFragment(name.to_string()));
        }
        let document = assemble(name, &self.fragments);
        let validator = compile(&document, &self.formats)?;
        Ok(PartValidator {
            name: name.to_string(),
            validator,
        })
    }
}

// ============================================================================
// SECTION: Part Validator
// ============================================================================

/// Validator scoped to one named fragment.
pub struct PartValidator {
    /// Fragment name.
    name: String,
    /// Compiled validator.
    validator: Validator,
}

impl fmt::Debug for PartValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartValidator").field("name", &self.name).finish_non_exhaustive()
    }
}

impl PartValidator {
    /// Returns the fragment name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true when `instance` satisfies the fragment.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Validates `instance` against the fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationError> {
        collect(&self.validator, instance, &format!("invalid {}", self.name))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Assembles a document rooted at `root` carrying every fragment.
fn assemble(root: &str, fragments: &BTreeMap<String, Value>) -> Value {
    let defs: Map<String, Value> =
        fragments.iter().map(|(name, fragment)| (name.clone(), fragment.clone())).collect();
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "$ref": format!("#/$defs/{root}"),
        "$defs": defs,
    })
}

/// Compiles an assembled document with the given format checkers.
fn compile(document: &Value, formats: &FormatRegistry) -> Result<Validator, SchemaError> {
    let mut options =
        jsonschema::options().with_draft(Draft::Draft202012).should_validate_formats(true);
    for (name, checker) in formats.iter() {
        options = options.with_format(name.to_string(), checker);
    }
    options.build(document).map_err(|err| SchemaError::Compile(err.to_string()))
}

/// Runs a validator and gathers every violation in sorted order.
fn collect(validator: &Validator, instance: &Value, headline: &str) -> Result<(), ValidationError> {
    let mut violations: Vec<Violation> = validator
        .iter_errors(instance)
        .map(|err| Violation::new(err.instance_path().to_string(), err.to_string()))
        .collect();
    if violations.is_empty() {
        return Ok(());
    }
    violations.sort();
    violations.dedup();
    Err(ValidationError::new(headline, violations))
}

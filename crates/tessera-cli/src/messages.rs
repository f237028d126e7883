// crates/tessera-cli/src/messages.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Keyed user-facing strings with named placeholders.
// Purpose: Keep every CLI message in one reviewable table.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! Every line the `tessera` binary prints goes through the [`t!`](crate::t)
//! macro, which looks a key up in a static catalog and substitutes
//! `{placeholder}` arguments.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Missing keys render as the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces.
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Message templates keyed by message id.
const MESSAGES: &[(&str, &str)] = &[
    ("main.version", "tessera {version}"),
    ("input.read_failed", "failed to read {kind} at {path}: {error}"),
    ("input.read_too_large", "{kind} at {path} is too large ({size} bytes > {limit} bytes)"),
    ("input.not_utf8", "{kind} at {path} is not valid UTF-8"),
    ("input.kind.app", "app config"),
    ("input.kind.secrets", "secret config"),
    ("input.kind.instruction", "update instruction"),
    ("validate.failed", "{path}: {error}"),
    ("validate.ok", "app config is valid"),
    ("validate.ok_with_secrets", "app config and secrets are valid ({count} secrets)"),
    ("secrets.apply_failed", "failed to apply update instruction: {error}"),
    ("secrets.serialize_failed", "failed to serialize secrets: {error}"),
    ("secrets.write_failed", "failed to write {path}: {error}"),
    ("secrets.apply.written", "wrote updated secrets to {path}"),
    ("secrets.apply.unchanged", "update instruction produced no changes"),
    ("diff.failed", "failed to diff snapshots: {error}"),
    ("schema.load_failed", "failed to build schema registry: {error}"),
    ("schema.unknown_part", "unknown schema part '{part}' (known parts: {known})"),
    ("schema.serialize_failed", "failed to serialize schema: {error}"),
    ("output.write_failed", "failed to write to {stream}: {error}"),
];

/// Returns the message catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    CATALOG.get_or_init(|| MESSAGES.iter().copied().collect())
}

/// Renders `key` with `args` substituted into its template.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::messages::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::messages::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::missing_docs_in_private_items,
        reason = "Test-only assertions are permitted."
    )]

    use super::MESSAGES;
    use super::catalog;

    #[test]
    fn placeholders_are_substituted() {
        let message = crate::t!("input.read_too_large", kind = "app config", path = "app.yaml", size = 9, limit = 4);
        assert_eq!(message, "app config at app.yaml is too large (9 bytes > 4 bytes)");
    }

    #[test]
    fn unknown_keys_render_as_the_key() {
        assert_eq!(crate::t!("missing.key"), "missing.key");
    }

    #[test]
    fn message_ids_are_unique() {
        assert_eq!(catalog().len(), MESSAGES.len());
    }
}

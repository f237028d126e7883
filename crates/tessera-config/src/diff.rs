// crates/tessera-config/src/diff.rs
// ============================================================================
// Module: Config Differ
// Description: Structural diff and audit rendering of configuration snapshots.
// Purpose: Show reviewers exactly what a configuration change does.
// Dependencies: serde, serde_jcs, serde_json, sha2, tessera-schema, tracing
// ============================================================================

//! ## Overview
//! Both snapshots are serialized to RFC 8785 (JCS) canonical JSON. Equal
//! canonical bytes mean no changes. Otherwise the canonical trees are walked
//! in sorted key order and index order, producing [`DiffEntry`] values and a
//! line-oriented report:
//!
//! ```text
//!   oauth:
//!     clients[0]:
//! -     access_token_lifetime_seconds: 1800
//! +     access_token_lifetime_seconds: 3600
//! ```
//!
//! Context lines start with two spaces, removed lines with `- `, added lines
//! with `+ `. Nesting adds two spaces after the marker.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use tessera_schema::json_pointer;

use crate::error::ConfigError;
use crate::masking::MaskPatterns;

// ============================================================================
// SECTION: Diff Model
// ============================================================================

/// What happened at one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffKind {
    /// Present only in the updated snapshot.
    Added {
        /// New value.
        value: Value,
    },
    /// Present only in the original snapshot.
    Removed {
        /// Old value.
        value: Value,
    },
    /// Present in both with different values.
    Changed {
        /// Old value.
        from: Value,
        /// New value.
        to: Value,
    },
}

/// One leaf-level change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    /// JSON pointer of the change.
    pub path: String,
    /// Change details.
    #[serde(flatten)]
    pub kind: DiffKind,
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigDiff {
    /// Rendered report; empty when nothing changed.
    pub text: String,
    /// True when the canonical forms differ.
    pub has_changes: bool,
    /// Changes in traversal order.
    pub entries: Vec<DiffEntry>,
    /// SHA-256 of the original canonical JSON, lowercase hex.
    pub original_digest: String,
    /// SHA-256 of the updated canonical JSON, lowercase hex.
    pub updated_digest: String,
}

// ============================================================================
// SECTION: Differ
// ============================================================================

/// Computes structural diffs of serializable snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigDiffer;

impl ConfigDiffer {
    /// Compares two snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] when a snapshot cannot be
    /// canonicalized.
    pub fn diff<T: Serialize + ?Sized>(original: &T, updated: &T) -> Result<ConfigDiff, ConfigError> {
        let (original_bytes, original_tree) = canonical_tree(original)?;
        let (updated_bytes, updated_tree) = canonical_tree(updated)?;
        let original_digest = sha256_hex(&original_bytes);
        let updated_digest = sha256_hex(&updated_bytes);
        if original_bytes == updated_bytes {
            return Ok(ConfigDiff {
                text: String::new(),
                has_changes: false,
                entries: Vec::new(),
                original_digest,
                updated_digest,
            });
        }
        let mut renderer = Renderer::default();
        renderer.node(&original_tree, &updated_tree, "", 0, &mut Vec::new());
        tracing::debug!(changes = renderer.entries.len(), "computed config diff");
        Ok(ConfigDiff {
            text: renderer.finish(),
            has_changes: true,
            entries: renderer.entries,
            original_digest,
            updated_digest,
        })
    }

    /// Compares two snapshots and redacts sensitive values in the result.
    ///
    /// Changes are detected on the unmasked values, so a rotated secret
    /// still shows up as a (masked) change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] when a snapshot cannot be
    /// canonicalized.
    pub fn diff_masked<T: Serialize + ?Sized>(
        original: &T,
        updated: &T,
        patterns: &MaskPatterns,
    ) -> Result<ConfigDiff, ConfigError> {
        let mut diff = Self::diff(original, updated)?;
        diff.text = patterns.mask(&diff.text);
        for entry in &mut diff.entries {
            match &mut entry.kind {
                DiffKind::Added {
                    value,
                }
                | DiffKind::Removed {
                    value,
                } => mask_value(value, patterns),
                DiffKind::Changed {
                    from,
                    to,
                } => {
                    mask_value(from, patterns);
                    mask_value(to, patterns);
                }
            }
        }
        Ok(diff)
    }
}

/// Returns the rendered report and whether anything changed.
///
/// # Errors
///
/// Returns [`ConfigError::Serialization`] when a snapshot cannot be
/// canonicalized.
pub fn diff_text<T: Serialize + ?Sized>(original: &T, updated: &T) -> Result<(String, bool), ConfigError> {
    let diff = ConfigDiffer::diff(original, updated)?;
    Ok((diff.text, diff.has_changes))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Line marker for unchanged context.
const CONTEXT_MARKER: &str = "  ";
/// Line marker for removed values.
const REMOVED_MARKER: &str = "- ";
/// Line marker for added values.
const ADDED_MARKER: &str = "+ ";

/// Accumulates report lines and entries during the walk.
#[derive(Debug, Default)]
struct Renderer {
    /// Report lines.
    lines: Vec<String>,
    /// Leaf-level changes.
    entries: Vec<DiffEntry>,
}

impl Renderer {
    /// Diffs one node; `label` is empty only for the document root.
    fn node(&mut self, original: &Value, updated: &Value, label: &str, depth: usize, path: &mut Vec<String>) {
        if original == updated {
            return;
        }
        match (original, updated) {
            (Value::Object(left), Value::Object(right)) => {
                let header_at = self.lines.len();
                let child_depth = if label.is_empty() { depth } else { depth + 1 };
                let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
                for key in keys {
                    path.push(key.clone());
                    match (left.get(key), right.get(key)) {
                        (Some(old), Some(new)) => self.node(old, new, key, child_depth, path),
                        (Some(old), None) => self.removed(old, key, child_depth, path),
                        (None, Some(new)) => self.added(new, key, child_depth, path),
                        (None, None) => {}
                    }
                    path.pop();
                }
                if !label.is_empty() {
                    self.lines.insert(header_at, line(CONTEXT_MARKER, depth, &format!("{label}:")));
                }
            }
            (Value::Array(left), Value::Array(right)) => {
                for index in 0 .. left.len().max(right.len()) {
                    let element = format!("{label}[{index}]");
                    path.push(index.to_string());
                    match (left.get(index), right.get(index)) {
                        (Some(old), Some(new)) => self.node(old, new, &element, depth, path),
                        (Some(old), None) => self.removed(old, &element, depth, path),
                        (None, Some(new)) => self.added(new, &element, depth, path),
                        (None, None) => {}
                    }
                    path.pop();
                }
            }
            _ => {
                self.lines.push(line(REMOVED_MARKER, depth, &labelled(label, original)));
                self.lines.push(line(ADDED_MARKER, depth, &labelled(label, updated)));
                self.entries.push(DiffEntry {
                    path: json_pointer(path.iter()),
                    kind: DiffKind::Changed {
                        from: original.clone(),
                        to: updated.clone(),
                    },
                });
            }
        }
    }

    /// Records a value present only in the original.
    fn removed(&mut self, value: &Value, label: &str, depth: usize, path: &[String]) {
        self.lines.push(line(REMOVED_MARKER, depth, &labelled(label, value)));
        self.entries.push(DiffEntry {
            path: json_pointer(path.iter()),
            kind: DiffKind::Removed {
                value: value.clone(),
            },
        });
    }

    /// Records a value present only in the update.
    fn added(&mut self, value: &Value, label: &str, depth: usize, path: &[String]) {
        self.lines.push(line(ADDED_MARKER, depth, &labelled(label, value)));
        self.entries.push(DiffEntry {
            path: json_pointer(path.iter()),
            kind: DiffKind::Added {
                value: value.clone(),
            },
        });
    }

    /// Joins the lines into the report.
    fn finish(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }
}

/// Formats one report line.
fn line(marker: &str, depth: usize, content: &str) -> String {
    format!("{marker}{}{content}", "  ".repeat(depth))
}

/// Formats `label: value`, or the bare value at the root.
fn labelled(label: &str, value: &Value) -> String {
    if label.is_empty() { value.to_string() } else { format!("{label}: {value}") }
}

// ============================================================================
// SECTION: Canonical Form
// ============================================================================

/// Returns the canonical bytes of `value` and the tree they describe.
fn canonical_tree<T: Serialize + ?Sized>(value: &T) -> Result<(Vec<u8>, Value), ConfigError> {
    let bytes = serde_jcs::to_vec(value).map_err(|err| ConfigError::Serialization(err.to_string()))?;
    let tree = serde_json::from_slice(&bytes).map_err(|err| ConfigError::Serialization(err.to_string()))?;
    Ok((bytes, tree))
}

/// Returns the lowercase hex SHA-256 of `bytes`.
fn sha256_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

/// Masks every string leaf of `value` in place.
fn mask_value(value: &mut Value, patterns: &MaskPatterns) {
    match value {
        Value::String(text) => *text = patterns.mask(text),
        Value::Array(items) => {
            for item in items {
                mask_value(item, patterns);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                mask_value(item, patterns);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

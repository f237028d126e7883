// crates/tessera-config/src/masking.rs
// ============================================================================
// Module: Secret Masking
// Description: Redaction of sensitive substrings in logs and messages.
// Purpose: Keep secret material out of errors, diffs, and log events.
// Dependencies: regex, serde_json
// ============================================================================

//! ## Overview
//! A [`MaskPatterns`] set holds plain substrings (usually the
//! `sensitive_strings` of decoded secret payloads) and optional regular
//! expressions. [`MaskPatterns::mask`] replaces every match with
//! [`MASK_TOKEN`]. Matches are located in the original text only, and
//! overlapping or adjacent matches collapse into one token, so a secret that
//! contains another secret is not partially revealed and a pattern never
//! matches inside an inserted token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Replacement written over masked text.
pub const MASK_TOKEN: &str = "********";

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Set of substrings and expressions to redact.
#[derive(Debug, Clone, Default)]
pub struct MaskPatterns {
    /// Plain substrings, longest first.
    plain: Vec<String>,
    /// Regular expressions applied after plain substrings.
    regexes: Vec<Regex>,
}

impl MaskPatterns {
    /// Creates an empty pattern set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            plain: Vec::new(),
            regexes: Vec::new(),
        }
    }

    /// Creates a set from plain substrings, ignoring empty ones.
    #[must_use]
    pub fn from_strings<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns = Self::new();
        for value in strings {
            patterns.add_plain(value);
        }
        patterns
    }

    /// Creates a set from every string leaf of a JSON value.
    #[must_use]
    pub fn from_value_leaves(value: &Value) -> Self {
        let mut leaves = Vec::new();
        collect_string_leaves(value, &mut leaves);
        Self::from_strings(leaves)
    }

    /// Adds a plain substring; empty strings are ignored.
    pub fn add_plain(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() || self.plain.contains(&value) {
            return;
        }
        self.plain.push(value);
        self.plain.sort_by(|left, right| right.len().cmp(&left.len()).then_with(|| left.cmp(right)));
    }

    /// Adds a regular expression.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] when the expression does not compile.
    pub fn add_regex(&mut self, pattern: &str) -> Result<(), regex::Error> {
        self.regexes.push(Regex::new(pattern)?);
        Ok(())
    }

    /// Merges another pattern set into this one.
    pub fn extend(&mut self, other: &Self) {
        for value in &other.plain {
            self.add_plain(value.clone());
        }
        self.regexes.extend(other.regexes.iter().cloned());
    }

    /// Returns true when no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.regexes.is_empty()
    }

    /// Returns `text` with every pattern occurrence redacted.
    #[must_use]
    pub fn mask(&self, text: &str) -> String {
        let mut spans: Vec<(usize, usize)> = Vec::new();
        for value in &self.plain {
            spans.extend(text.match_indices(value.as_str()).map(|(start, found)| (start, start + found.len())));
        }
        for regex in &self.regexes {
            spans.extend(regex.find_iter(text).filter(|found| !found.is_empty()).map(|found| (found.start(), found.end())));
        }
        if spans.is_empty() {
            return text.to_string();
        }
        spans.sort_unstable();
        let mut masked = String::with_capacity(text.len());
        let mut cursor = 0;
        let mut open: Option<(usize, usize)> = None;
        for (start, end) in spans {
            match open {
                Some((_, open_end)) if start <= open_end => {
                    open = open.map(|(open_start, _)| (open_start, open_end.max(end)));
                }
                _ => {
                    if let Some((open_start, open_end)) = open {
                        masked.push_str(&text[cursor .. open_start]);
                        masked.push_str(MASK_TOKEN);
                        cursor = open_end;
                    }
                    open = Some((start, end));
                }
            }
        }
        if let Some((open_start, open_end)) = open {
            masked.push_str(&text[cursor .. open_start]);
            masked.push_str(MASK_TOKEN);
            cursor = open_end;
        }
        masked.push_str(&text[cursor ..]);
        masked
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Pushes every string found in `value` onto `out`.
fn collect_string_leaves(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => out.push(text.clone()),
        Value::Array(items) => {
            for item in items {
                collect_string_leaves(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_string_leaves(item, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

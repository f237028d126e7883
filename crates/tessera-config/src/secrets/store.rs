// crates/tessera-config/src/secrets/store.rs
// ============================================================================
// Module: Secret Store
// Description: Secret snapshots, per-item decoding, lookup, and overlay.
// Purpose: Hold at most one decoded payload per secret key.
// Dependencies: serde, serde_json, tessera-schema, tracing
// ============================================================================

//! ## Overview
//! A [`SecretConfig`] is an ordered list of [`SecretItem`]s with at most one
//! item per [`SecretKey`]. Snapshots are immutable: every operation that
//! changes the item list ([`SecretConfig::with_item`],
//! [`SecretConfig::without`], [`SecretConfig::overlay`]) returns a new value.
//!
//! Parsing validates the envelope against the secret schema, decodes each
//! item by its key, defaults it, then runs the payload's own rules. Decode
//! errors are redacted with the string leaves of the offending item.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde::ser::SerializeStruct;
use serde_json::Value;
use tessera_schema::ValidationContext;
use tessera_schema::ValidationError;
use tessera_schema::Violation;

use super::key::SecretKey;
use super::payload::SecretData;
use super::payload::SecretPayload;
use super::schema::secret_config_schema;
use crate::app::parse_document;
use crate::defaults::apply_defaults;
use crate::error::ConfigError;
use crate::masking::MaskPatterns;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Headline of aggregated secret document errors.
pub const SECRET_CONFIG_HEADLINE: &str = "invalid secrets";

// ============================================================================
// SECTION: Secret Item
// ============================================================================

/// One decoded secret entry.
///
/// # Invariants
/// - `payload.key() == key`.
/// - `raw_data` is the data exactly as received or as re-serialized from the
///   payload when the item was constructed in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretItem {
    /// Discriminator.
    key: SecretKey,
    /// Undecoded item data.
    raw_data: Value,
    /// Decoded and defaulted payload.
    payload: SecretPayload,
}

impl SecretItem {
    /// Builds an item from typed data, defaulting it first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] when the data cannot be
    /// serialized.
    pub fn from_data<T: SecretData>(mut data: T) -> Result<Self, ConfigError> {
        apply_defaults(&mut data);
        let raw_data = serde_json::to_value(&data).map_err(|err| ConfigError::Serialization(err.to_string()))?;
        Ok(Self {
            key: T::KEY,
            raw_data,
            payload: data.into(),
        })
    }

    /// Returns the discriminator.
    #[must_use]
    pub const fn key(&self) -> SecretKey {
        self.key
    }

    /// Returns the undecoded data.
    #[must_use]
    pub const fn raw_data(&self) -> &Value {
        &self.raw_data
    }

    /// Returns the decoded payload.
    #[must_use]
    pub const fn payload(&self) -> &SecretPayload {
        &self.payload
    }

    /// Returns the payload as `T` when the key matches.
    #[must_use]
    pub fn data<T: SecretData>(&self) -> Option<&T> {
        T::from_payload(&self.payload)
    }
}

impl Serialize for SecretItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SecretItem", 2)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("data", &self.raw_data)?;
        state.end()
    }
}

// ============================================================================
// SECTION: Secret Config
// ============================================================================

/// Immutable secret snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecretConfig {
    /// Items in document order, one per key.
    items: Vec<SecretItem>,
}

impl SecretConfig {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
        }
    }

    /// Creates a snapshot from items.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when two items share a key.
    pub fn from_items(items: Vec<SecretItem>) -> Result<Self, ConfigError> {
        let mut context = ValidationContext::new();
        let mut seen = BTreeMap::new();
        for (index, item) in items.iter().enumerate() {
            if seen.insert(item.key, index).is_some() {
                context.emit(format!("/secrets/{index}/key"), format!("duplicated secret key '{}'", item.key));
            }
        }
        context.finish(SECRET_CONFIG_HEADLINE).map_err(ConfigError::Validation)?;
        Ok(Self {
            items,
        })
    }

    /// Returns the items in document order.
    #[must_use]
    pub fn items(&self) -> &[SecretItem] {
        &self.items
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the snapshot holds no item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item stored under `key` with its position.
    #[must_use]
    pub fn find(&self, key: SecretKey) -> Option<(usize, &SecretItem)> {
        self.items.iter().enumerate().find(|(_, item)| item.key == key)
    }

    /// Returns the payload stored under `key`.
    #[must_use]
    pub fn lookup(&self, key: SecretKey) -> Option<&SecretPayload> {
        self.find(key).map(|(_, item)| &item.payload)
    }

    /// Returns the payload stored under `key` with its position.
    #[must_use]
    pub fn lookup_with_index(&self, key: SecretKey) -> Option<(usize, &SecretPayload)> {
        self.find(key).map(|(index, item)| (index, &item.payload))
    }

    /// Returns the typed payload of `T`'s key.
    #[must_use]
    pub fn lookup_data<T: SecretData>(&self) -> Option<&T> {
        self.lookup(T::KEY).and_then(T::from_payload)
    }

    /// Returns a snapshot with `item` replacing the item of the same key in
    /// place, or appended when the key is absent.
    #[must_use]
    pub fn with_item(&self, item: SecretItem) -> Self {
        let mut items = self.items.clone();
        match items.iter().position(|existing| existing.key == item.key) {
            Some(index) => items[index] = item,
            None => items.push(item),
        }
        Self {
            items,
        }
    }

    /// Returns a snapshot without the item of `key`; unchanged when absent.
    #[must_use]
    pub fn without(&self, key: SecretKey) -> Self {
        Self {
            items: self.items.iter().filter(|item| item.key != key).cloned().collect(),
        }
    }

    /// Layers snapshots by key; later layers replace earlier items entirely.
    ///
    /// The result is sorted by key wire name.
    #[must_use]
    pub fn overlay(base: &Self, layers: &[&Self]) -> Self {
        let mut merged: BTreeMap<SecretKey, SecretItem> = BTreeMap::new();
        for item in &base.items {
            merged.insert(item.key, item.clone());
        }
        for (layer_index, layer) in layers.iter().enumerate() {
            for item in &layer.items {
                if merged.insert(item.key, item.clone()).is_some() {
                    tracing::warn!(key = %item.key, layer = layer_index + 1, "secret overlay replaced item");
                }
            }
        }
        Self {
            items: merged.into_values().collect(),
        }
    }

    /// Returns every sensitive value held by the snapshot.
    #[must_use]
    pub fn sensitive_strings(&self) -> Vec<String> {
        self.items.iter().flat_map(|item| item.payload.sensitive_strings()).collect()
    }

    /// Returns masking patterns for every sensitive value.
    #[must_use]
    pub fn mask_patterns(&self) -> MaskPatterns {
        MaskPatterns::from_strings(self.sensitive_strings())
    }

    /// Serializes the snapshot to its document form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialization`] when serialization fails.
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        serde_json::to_value(self).map_err(|err| ConfigError::Serialization(err.to_string()))
    }

    /// Sends the snapshot through the full parse pipeline again.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the serialized snapshot is not a valid
    /// secret document.
    pub fn reparse(&self) -> Result<Self, ConfigError> {
        let document = self.to_value()?;
        validate_envelope(&document)?;
        decode_document(&document)
    }
}

impl Serialize for SecretConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SecretConfig", 1)?;
        state.serialize_field("secrets", &self.items)?;
        state.end()
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Envelope as written in documents.
#[derive(Debug, Deserialize)]
struct RawSecretConfig {
    /// Items in document order.
    #[serde(default)]
    secrets: Vec<RawSecretItem>,
}

/// Item as written in documents.
#[derive(Debug, Deserialize)]
struct RawSecretItem {
    /// Wire key, checked during decoding.
    key: String,
    /// Payload data.
    #[serde(default)]
    data: Value,
}

/// Parses, validates, decodes, and defaults a secret document.
///
/// # Errors
///
/// Returns [`ConfigError`] for the first failing stage; document stages
/// report every violation of that stage.
pub fn parse_secret_config(text: &str) -> Result<SecretConfig, ConfigError> {
    let document = parse_document(text)?;
    validate_envelope(&document)?;
    decode_document(&document)
}

/// Decodes a secret document from a trusted source without envelope schema
/// validation; per-item decoding, defaulting, and rules still run.
///
/// # Errors
///
/// Returns [`ConfigError`] when an item cannot be decoded or violates its
/// payload rules.
pub fn parse_partial_secret(text: &str) -> Result<SecretConfig, ConfigError> {
    let document = parse_document(text)?;
    decode_document(&document)
}

/// Validates an envelope against the secret schema with payload values masked.
fn validate_envelope(document: &Value) -> Result<(), ConfigError> {
    secret_config_schema()?.validate_with_message(document, SECRET_CONFIG_HEADLINE).map_err(|mut err| {
        let patterns = payload_patterns(document);
        for violation in &mut err.violations {
            violation.message = patterns.mask(&violation.message);
        }
        ConfigError::Schema(err)
    })
}

/// Returns patterns for every string inside item payloads.
///
/// Items that are not objects are masked whole; keys stay readable.
fn payload_patterns(document: &Value) -> MaskPatterns {
    let Some(items) = document.get("secrets").and_then(Value::as_array) else {
        return MaskPatterns::from_value_leaves(document);
    };
    let mut patterns = MaskPatterns::new();
    for item in items {
        let payload = if item.is_object() { item.get("data").unwrap_or(&Value::Null) } else { item };
        patterns.extend(&MaskPatterns::from_value_leaves(payload));
    }
    patterns
}

/// Decodes every item of an envelope, then checks payload rules.
fn decode_document(document: &Value) -> Result<SecretConfig, ConfigError> {
    let raw = RawSecretConfig::deserialize(document).map_err(|err| {
        let masked = payload_patterns(document).mask(&err.to_string());
        ConfigError::Decode(ValidationError::new(SECRET_CONFIG_HEADLINE, vec![Violation::new("", masked)]))
    })?;

    let mut context = ValidationContext::new();
    let mut seen = BTreeMap::new();
    let mut items = Vec::with_capacity(raw.secrets.len());
    for (index, entry) in raw.secrets.into_iter().enumerate() {
        let key = match entry.key.parse::<SecretKey>() {
            Ok(key) => key,
            Err(err) => {
                context.emit(format!("/secrets/{index}/key"), err.to_string());
                continue;
            }
        };
        if seen.insert(key, index).is_some() {
            context.emit(format!("/secrets/{index}/key"), format!("duplicated secret key '{key}'"));
            continue;
        }
        match SecretPayload::decode(key, &entry.data) {
            Ok(mut payload) => {
                apply_defaults(&mut payload);
                items.push(SecretItem {
                    key,
                    raw_data: entry.data,
                    payload,
                });
            }
            Err(err) => {
                let masked = MaskPatterns::from_value_leaves(&entry.data).mask(&err.to_string());
                context.emit(format!("/secrets/{index}/data"), format!("invalid {}: {masked}", key.description()));
            }
        }
    }
    context.finish(SECRET_CONFIG_HEADLINE).map_err(ConfigError::Decode)?;

    let mut rules = ValidationContext::new();
    for (index, item) in items.iter().enumerate() {
        item.payload.validate(&mut rules, &format!("/secrets/{index}/data"));
    }
    rules.finish(SECRET_CONFIG_HEADLINE).map_err(ConfigError::Validation)?;

    tracing::debug!(items = items.len(), "parsed secret config");
    Ok(SecretConfig {
        items,
    })
}

// crates/tessera-config/src/app/localization.rs
// ============================================================================
// Module: Localization Config
// Description: Fallback and supported UI languages.
// Purpose: Declare the language set offered to end users.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! The supported language list defaults to the fallback language alone, and
//! the fallback must always be one of the supported languages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;

use crate::defaults::NullableFields;
use crate::defaults::SetDefaults;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Language used when nothing else is configured.
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Localization settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizationConfig {
    /// Language used when no supported language matches the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_language: Option<String>,
    /// Languages offered to end users.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_languages: Vec<String>,
}

impl LocalizationConfig {
    /// Returns the fallback language, defaulted or not.
    #[must_use]
    pub fn fallback_language(&self) -> &str {
        self.fallback_language.as_deref().unwrap_or(DEFAULT_FALLBACK_LANGUAGE)
    }
}

impl SetDefaults for LocalizationConfig {
    fn set_defaults(&mut self) {
        if self.fallback_language.is_none() {
            self.fallback_language = Some(DEFAULT_FALLBACK_LANGUAGE.to_string());
        }
        if self.supported_languages.is_empty() {
            self.supported_languages = vec![self.fallback_language().to_string()];
        }
    }
}

impl NullableFields for LocalizationConfig {}
crate::populate_defaults!(LocalizationConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the localization fragment.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "LocalizationConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "fallback_language": { "type": "string", "format": "bcp47" },
                "supported_languages": {
                    "type": "array",
                    "items": { "type": "string", "format": "bcp47" },
                    "uniqueItems": true
                }
            }
        }),
    )
}

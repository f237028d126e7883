// crates/tessera-config/src/app/bot_protection.rs
// ============================================================================
// Module: Bot Protection Config
// Description: CAPTCHA-style bot protection provider selection.
// Purpose: Declare the provider whose secret key must be present.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Bot protection is a nullable section of the application config: an absent
//! section means "not configured" and is never allocated by defaulting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;
use tessera_schema::fragment_ref;

use crate::defaults::NullableFields;
use crate::defaults::SetDefaults;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bot protection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotProtectionConfig {
    /// Whether bot protection is active.
    #[serde(default)]
    pub enabled: bool,
    /// Selected provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<BotProtectionProvider>,
}

impl SetDefaults for BotProtectionConfig {}

impl NullableFields for BotProtectionConfig {
    const NULLABLE_FIELDS: &'static [&'static str] = &["provider"];
}

crate::populate_defaults!(BotProtectionConfig { provider });

/// Supported provider kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotProtectionProviderType {
    /// Cloudflare Turnstile.
    #[default]
    Cloudflare,
    /// Google reCAPTCHA v2.
    Recaptchav2,
}

impl BotProtectionProviderType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cloudflare => "cloudflare",
            Self::Recaptchav2 => "recaptchav2",
        }
    }
}

impl fmt::Display for BotProtectionProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selected bot protection provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotProtectionProvider {
    /// Provider kind.
    #[serde(rename = "type")]
    pub provider_type: BotProtectionProviderType,
    /// Public site key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_key: Option<String>,
}

impl SetDefaults for BotProtectionProvider {}
impl NullableFields for BotProtectionProvider {}
crate::populate_defaults!(BotProtectionProvider {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the bot protection fragments.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add("BotProtectionProviderType", json!({ "type": "string", "enum": ["cloudflare", "recaptchav2"] }))?;
    builder.add(
        "BotProtectionConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "enabled": { "type": "boolean" },
                "provider": fragment_ref("BotProtectionProvider")
            },
            "allOf": [
                {
                    "if": { "properties": { "enabled": { "const": true } }, "required": ["enabled"] },
                    "then": { "required": ["provider"] }
                }
            ]
        }),
    )?;
    builder.add(
        "BotProtectionProvider",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "type": fragment_ref("BotProtectionProviderType"),
                "site_key": { "type": "string" }
            },
            "required": ["type"]
        }),
    )
}

// crates/tessera-config/src/app/authentication.rs
// ============================================================================
// Module: Authentication Config
// Description: Enabled identity kinds and primary authenticators.
// Purpose: Declare which sign-in methods are offered.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Both lists default when left empty.

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
// SECTION: Types
// ============================================================================

/// Authentication settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationConfig {
    /// Enabled identity kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<String>,
    /// Enabled primary authenticators.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub primary_authenticators: Vec<String>,
}

impl SetDefaults for AuthenticationConfig {
    fn set_defaults(&mut self) {
        if self.identities.is_empty() {
            self.identities = vec!["oauth".to_string(), "login_id".to_string()];
        }
        if self.primary_authenticators.is_empty() {
            self.primary_authenticators = vec!["password".to_string()];
        }
    }
}

impl NullableFields for AuthenticationConfig {}
crate::populate_defaults!(AuthenticationConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the authentication fragment.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "AuthenticationConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "identities": {
                    "type": "array",
                    "uniqueItems": true,
                    "items": { "type": "string", "enum": ["oauth", "login_id", "anonymous", "biometric", "passkey"] }
                },
                "primary_authenticators": {
                    "type": "array",
                    "uniqueItems": true,
                    "items": { "type": "string", "enum": ["password", "passkey", "oob_otp_email", "oob_otp_sms"] }
                }
            }
        }),
    )
}

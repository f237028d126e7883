// crates/tessera-config/src/app/http.rs
// ============================================================================
// Module: HTTP Config
// Description: Public origin, CORS origins, and cookie naming.
// Purpose: Describe how the application is reached over HTTP.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! HTTP settings are plain leaves; the only project-specific rule is that
//! the public origin uses the `http-origin` format.

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

/// HTTP settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Origin the application is served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_origin: Option<String>,
    /// Additional origins allowed for cross-origin requests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,
    /// Prefix applied to every cookie name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_prefix: Option<String>,
}

impl SetDefaults for HttpConfig {}
impl NullableFields for HttpConfig {}
crate::populate_defaults!(HttpConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the HTTP fragments.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "HTTPConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "public_origin": { "type": "string", "format": "http-origin" },
                "allowed_origins": {
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 }
                },
                "cookie_prefix": { "type": "string" }
            }
        }),
    )
}

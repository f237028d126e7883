// crates/tessera-config/src/app/oauth.rs
// ============================================================================
// Module: OAuth Client Config
// Description: OAuth clients registered against the application.
// Purpose: Declare clients, their redirect URIs, and token lifetimes.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Confidential clients authenticate with a client secret and therefore need
//! a matching entry in the `oauth.client_secrets` secret.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;
use tessera_schema::fragment_ref;

use crate::defaults::NullableFields;
use crate::defaults::SetDefaults;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default access token lifetime in seconds.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS: u64 = 1800;
/// Default refresh token lifetime in seconds.
pub const DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS: u64 = 86_400;

// ============================================================================
// SECTION: Types
// ============================================================================

/// OAuth settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Registered clients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<OAuthClientConfig>,
}

impl OAuthConfig {
    /// Iterates clients that authenticate with a secret.
    pub fn confidential_clients(&self) -> impl Iterator<Item = &OAuthClientConfig> {
        self.clients.iter().filter(|client| client.is_confidential())
    }
}

impl SetDefaults for OAuthConfig {}
impl NullableFields for OAuthConfig {}
crate::populate_defaults!(OAuthConfig { clients });

/// Client application kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    /// Single-page browser application.
    Spa,
    /// Server-rendered web application.
    TraditionalWebapp,
    /// Mobile or desktop application.
    Native,
    /// Machine-to-machine client holding a secret.
    Confidential,
    /// Third-party client holding a secret.
    ThirdPartyApp,
}

/// One registered OAuth client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    /// Client identifier.
    pub client_id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Application kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_application_type: Option<ApplicationType>,
    /// Allowed redirect URIs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    /// Access token lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_lifetime_seconds: Option<u64>,
    /// Refresh token lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_lifetime_seconds: Option<u64>,
}

impl OAuthClientConfig {
    /// Returns true when the client authenticates with a secret.
    #[must_use]
    pub fn is_confidential(&self) -> bool {
        matches!(
            self.x_application_type,
            Some(ApplicationType::Confidential | ApplicationType::ThirdPartyApp)
        )
    }
}

impl SetDefaults for OAuthClientConfig {
    fn set_defaults(&mut self) {
        if self.access_token_lifetime_seconds.is_none() {
            self.access_token_lifetime_seconds = Some(DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS);
        }
        if self.refresh_token_lifetime_seconds.is_none() {
            let access = self.access_token_lifetime_seconds.unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS);
            self.refresh_token_lifetime_seconds = Some(DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS.max(access));
        }
    }
}

impl NullableFields for OAuthClientConfig {}
crate::populate_defaults!(OAuthClientConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the OAuth client fragments.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "OAuthConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "clients": { "type": "array", "items": fragment_ref("OAuthClientConfig") }
            }
        }),
    )?;
    builder.add(
        "OAuthClientConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "client_id": { "type": "string", "minLength": 1 },
                "name": { "type": "string" },
                "x_application_type": {
                    "type": "string",
                    "enum": ["spa", "traditional_webapp", "native", "confidential", "third_party_app"]
                },
                "redirect_uris": {
                    "type": "array",
                    "items": { "type": "string", "minLength": 1 }
                },
                "access_token_lifetime_seconds": { "type": "integer", "minimum": 300 },
                "refresh_token_lifetime_seconds": { "type": "integer", "minimum": 300 }
            },
            "required": ["client_id"]
        }),
    )
}

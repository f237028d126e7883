// crates/tessera-config/src/app/identity.rs
// ============================================================================
// Module: Identity Config
// Description: Login ID keys and OAuth SSO identity providers.
// Purpose: Declare how end users identify themselves.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Login ID keys carry both the deprecated `modify_disabled` flag and its
//! finer-grained replacements. Each replacement that is not set explicitly
//! takes the value of `modify_disabled` when that is set, otherwise `false`.
//! The deprecated flag is never derived from the new ones.
//!
//! OAuth SSO providers are the source of the per-alias client secret
//! requirement enforced by the secret validator.

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
use crate::defaults::apply_defaults;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum length of an email login ID (RFC 3696).
pub const DEFAULT_EMAIL_MAX_LENGTH: u32 = 320;
/// Default maximum length of a phone login ID.
pub const DEFAULT_PHONE_MAX_LENGTH: u32 = 40;
/// Default maximum length of a username login ID.
pub const DEFAULT_USERNAME_MAX_LENGTH: u32 = 40;

// ============================================================================
// SECTION: Identity
// ============================================================================

/// Identity settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Login ID settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_id: Option<LoginIdConfig>,
    /// OAuth SSO settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthSsoConfig>,
}

impl IdentityConfig {
    /// Returns the configured OAuth SSO providers.
    #[must_use]
    pub fn oauth_providers(&self) -> &[OAuthSsoProviderConfig] {
        self.oauth.as_ref().map(|oauth| oauth.providers.as_slice()).unwrap_or_default()
    }
}

impl SetDefaults for IdentityConfig {}
impl NullableFields for IdentityConfig {}
crate::populate_defaults!(IdentityConfig { login_id, oauth });

// ============================================================================
// SECTION: Login ID
// ============================================================================

/// Login ID settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginIdConfig {
    /// Accepted login ID keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<LoginIdKeyConfig>,
}

impl SetDefaults for LoginIdConfig {
    fn set_defaults(&mut self) {
        if self.keys.is_empty() {
            let mut key = LoginIdKeyConfig::new(LoginIdKeyType::Email);
            apply_defaults(&mut key);
            self.keys.push(key);
        }
    }
}

impl NullableFields for LoginIdConfig {}
crate::populate_defaults!(LoginIdConfig { keys });

/// Login ID kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginIdKeyType {
    /// Email address.
    #[default]
    Email,
    /// E.164 phone number.
    Phone,
    /// Free-form username.
    Username,
}

impl LoginIdKeyType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Username => "username",
        }
    }

    /// Returns the default maximum length for this kind.
    #[must_use]
    pub const fn default_max_length(self) -> u32 {
        match self {
            Self::Email => DEFAULT_EMAIL_MAX_LENGTH,
            Self::Phone => DEFAULT_PHONE_MAX_LENGTH,
            Self::Username => DEFAULT_USERNAME_MAX_LENGTH,
        }
    }
}

/// One accepted login ID key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginIdKeyConfig {
    /// Key name; defaults to the type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Login ID kind.
    #[serde(rename = "type")]
    pub key_type: LoginIdKeyType,
    /// Maximum accepted length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Deprecated: disables create, update, and delete at once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_disabled: Option<bool>,
    /// Disables adding a login ID of this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_disabled: Option<bool>,
    /// Disables changing a login ID of this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_disabled: Option<bool>,
    /// Disables removing a login ID of this key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_disabled: Option<bool>,
}

impl LoginIdKeyConfig {
    /// Creates an undefaulted key of the given type.
    #[must_use]
    pub fn new(key_type: LoginIdKeyType) -> Self {
        Self {
            key_type,
            ..Self::default()
        }
    }

    /// Returns the key name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or_else(|| self.key_type.as_str())
    }

    /// Returns whether creating a login ID of this key is disabled.
    #[must_use]
    pub fn create_disabled(&self) -> bool {
        self.create_disabled.unwrap_or_else(|| self.modify_fallback())
    }

    /// Returns whether updating a login ID of this key is disabled.
    #[must_use]
    pub fn update_disabled(&self) -> bool {
        self.update_disabled.unwrap_or_else(|| self.modify_fallback())
    }

    /// Returns whether deleting a login ID of this key is disabled.
    #[must_use]
    pub fn delete_disabled(&self) -> bool {
        self.delete_disabled.unwrap_or_else(|| self.modify_fallback())
    }

    /// Value the fine-grained flags fall back to.
    fn modify_fallback(&self) -> bool {
        self.modify_disabled.unwrap_or(false)
    }
}

impl SetDefaults for LoginIdKeyConfig {
    fn set_defaults(&mut self) {
        if self.key.is_none() {
            self.key = Some(self.key_type.as_str().to_string());
        }
        if self.max_length.is_none() {
            self.max_length = Some(self.key_type.default_max_length());
        }
        let fallback = self.modify_fallback();
        if self.create_disabled.is_none() {
            self.create_disabled = Some(fallback);
        }
        if self.update_disabled.is_none() {
            self.update_disabled = Some(fallback);
        }
        if self.delete_disabled.is_none() {
            self.delete_disabled = Some(fallback);
        }
        if self.modify_disabled.is_none() {
            self.modify_disabled = Some(false);
        }
    }
}

impl NullableFields for LoginIdKeyConfig {}
crate::populate_defaults!(LoginIdKeyConfig {});

// ============================================================================
// SECTION: OAuth SSO
// ============================================================================

/// OAuth SSO settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSsoConfig {
    /// Configured identity providers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<OAuthSsoProviderConfig>,
}

impl SetDefaults for OAuthSsoConfig {}
impl NullableFields for OAuthSsoConfig {}
crate::populate_defaults!(OAuthSsoConfig { providers });

/// Where an SSO provider's client credentials come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsBehavior {
    /// The project supplies its own client secret.
    #[default]
    UseProjectCredentials,
    /// Shared demo credentials are used; no project secret is needed.
    UseDemoCredentials,
}

/// One OAuth identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSsoProviderConfig {
    /// Unique alias; secrets are matched by alias.
    pub alias: String,
    /// Provider kind, e.g. `google`.
    #[serde(rename = "type")]
    pub provider_type: String,
    /// OAuth client identifier issued by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Credential source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_behavior: Option<CredentialsBehavior>,
    /// Disables linking and unlinking this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modify_disabled: Option<bool>,
}

impl OAuthSsoProviderConfig {
    /// Returns the effective credential source.
    #[must_use]
    pub fn credentials_behavior(&self) -> CredentialsBehavior {
        self.credentials_behavior.unwrap_or_default()
    }
}

impl SetDefaults for OAuthSsoProviderConfig {
    fn set_defaults(&mut self) {
        if self.credentials_behavior.is_none() {
            self.credentials_behavior = Some(CredentialsBehavior::UseProjectCredentials);
        }
        if self.modify_disabled.is_none() {
            self.modify_disabled = Some(false);
        }
    }
}

impl NullableFields for OAuthSsoProviderConfig {}
crate::populate_defaults!(OAuthSsoProviderConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the identity fragments.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "IdentityConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "login_id": fragment_ref("LoginIDConfig"),
                "oauth": fragment_ref("OAuthSSOConfig")
            }
        }),
    )?;
    builder.add(
        "LoginIDConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "keys": { "type": "array", "items": fragment_ref("LoginIDKeyConfig") }
            }
        }),
    )?;
    builder.add("LoginIDKeyType", json!({ "type": "string", "enum": ["email", "phone", "username"] }))?;
    builder.add(
        "LoginIDKeyConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "key": { "type": "string", "minLength": 1 },
                "type": fragment_ref("LoginIDKeyType"),
                "max_length": { "type": "integer", "minimum": 1 },
                "modify_disabled": { "type": "boolean" },
                "create_disabled": { "type": "boolean" },
                "update_disabled": { "type": "boolean" },
                "delete_disabled": { "type": "boolean" }
            },
            "required": ["type"]
        }),
    )?;
    builder.add(
        "OAuthSSOConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "providers": { "type": "array", "items": fragment_ref("OAuthSSOProviderConfig") }
            }
        }),
    )?;
    builder.add(
        "OAuthSSOProviderConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "alias": { "type": "string", "minLength": 1 },
                "type": {
                    "type": "string",
                    "enum": ["google", "facebook", "github", "linkedin", "azureadv2", "azureadb2c", "adfs", "apple", "wechat"]
                },
                "client_id": { "type": "string" },
                "credentials_behavior": {
                    "type": "string",
                    "enum": ["use_project_credentials", "use_demo_credentials"]
                },
                "modify_disabled": { "type": "boolean" }
            },
            "required": ["alias", "type"]
        }),
    )
}

// crates/tessera-config/src/secrets/schema.rs
// ============================================================================
// Module: Secret Schema
// Description: Envelope and per-key payload fragments of the secret document.
// Purpose: Enforce each key's payload shape inside one envelope schema.
// Dependencies: serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! The envelope fragment `SecretItem` selects its payload fragment with one
//! `if key == K then data: schema(K)` clause per [`SecretKey`], so a single
//! validation pass enforces every item's shape. The key itself is only
//! required to be a string: an unknown key is reported by the decode stage
//! together with the item position.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::OnceLock;

use serde_json::Value;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;
use tessera_schema::SchemaRegistry;
use tessera_schema::fragment_ref;

use super::key::SecretKey;
use crate::error::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root fragment of the secret document.
pub const SECRET_CONFIG_ROOT: &str = "SecretConfig";

// ============================================================================
// SECTION: Registration
// ============================================================================

/// Registers the envelope and every payload fragment.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateFragment`] when a fragment name collides.
pub fn register_secret_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        SECRET_CONFIG_ROOT,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "secrets": { "type": "array", "items": fragment_ref("SecretItem") }
            },
            "required": ["secrets"]
        }),
    )?;
    builder.add("SecretItem", secret_item_fragment())?;
    register_key_fragments(builder)?;
    register_credential_fragments(builder)?;
    register_key_material_fragments(builder)
}

/// Builds the item fragment with one payload clause per key.
fn secret_item_fragment() -> Value {
    let clauses: Vec<Value> = SecretKey::ALL
        .into_iter()
        .map(|key| {
            json!({
                "if": { "properties": { "key": { "const": key.as_str() } }, "required": ["key"] },
                "then": { "properties": { "data": fragment_ref(key.schema_name()) } }
            })
        })
        .collect();
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "key": { "type": "string", "minLength": 1 },
            "data": {}
        },
        "required": ["key", "data"],
        "allOf": clauses
    })
}

/// Registers JWK building blocks.
fn register_key_fragments(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "JWK",
        json!({
            "type": "object",
            "properties": {
                "kid": { "type": "string", "minLength": 1 },
                "kty": { "type": "string", "minLength": 1 }
            },
            "required": ["kid", "kty"]
        }),
    )?;
    builder.add(
        "JWS",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "keys": { "type": "array", "items": fragment_ref("JWK") }
            },
            "required": ["keys"]
        }),
    )
}

/// Registers connection and messaging credential fragments.
fn register_credential_fragments(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let database = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "database_url": { "type": "string", "minLength": 1 },
            "database_schema": { "type": "string", "minLength": 1 }
        },
        "required": ["database_url"]
    });
    builder.add(SecretKey::Database.schema_name(), database.clone())?;
    builder.add(SecretKey::AuditDatabase.schema_name(), database)?;
    builder.add(SecretKey::Elasticsearch.schema_name(), url_fragment("elasticsearch_url"))?;
    builder.add(SecretKey::Redis.schema_name(), url_fragment("redis_url"))?;
    builder.add(SecretKey::AnalyticRedis.schema_name(), url_fragment("redis_url"))?;
    builder.add(
        SecretKey::OAuthSsoProvider.schema_name(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "alias": { "type": "string", "minLength": 1 },
                            "client_secret": { "type": "string" }
                        },
                        "required": ["alias"]
                    }
                }
            },
            "required": ["items"]
        }),
    )?;
    builder.add("SMTPMode", json!({ "type": "string", "enum": ["normal", "ssl"] }))?;
    builder.add(
        SecretKey::Smtp.schema_name(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "host": { "type": "string", "minLength": 1 },
                "port": { "type": "integer" },
                "mode": fragment_ref("SMTPMode"),
                "username": { "type": "string" },
                "password": { "type": "string" }
            },
            "required": ["host", "port", "username", "password"]
        }),
    )?;
    builder.add(SecretKey::Twilio.schema_name(), string_pair_fragment("account_sid", "auth_token"))?;
    builder.add(SecretKey::Nexmo.schema_name(), string_pair_fragment("api_key", "api_secret"))?;
    builder.add(
        SecretKey::BotProtectionProvider.schema_name(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "type": { "type": "string", "enum": ["cloudflare", "recaptchav2"] },
                "secret_key": { "type": "string", "minLength": 1 }
            },
            "required": ["type", "secret_key"]
        }),
    )
}

/// Registers JWK-set payload fragments.
fn register_key_material_fragments(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    for key in [SecretKey::AdminApiAuth, SecretKey::OAuth, SecretKey::Csrf, SecretKey::Webhook, SecretKey::Images] {
        builder.add(key.schema_name(), fragment_ref("JWS"))?;
    }
    builder.add(
        SecretKey::OAuthClientSecrets.schema_name(),
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "additionalProperties": false,
                        "properties": {
                            "client_id": { "type": "string", "minLength": 1 },
                            "keys": { "type": "array", "items": fragment_ref("JWK") }
                        },
                        "required": ["client_id", "keys"]
                    }
                }
            },
            "required": ["items"]
        }),
    )
}

/// Object with one required, non-empty URL string.
fn url_fragment(field: &str) -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": { field: { "type": "string", "minLength": 1 } },
        "required": [field]
    })
}

/// Object with two required, non-empty strings.
fn string_pair_fragment(first: &str, second: &str) -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            first: { "type": "string", "minLength": 1 },
            second: { "type": "string", "minLength": 1 }
        },
        "required": [first, second]
    })
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a fresh secret schema registry.
///
/// # Errors
///
/// Returns [`SchemaError`] when fragments collide or fail to compile.
pub fn build_secret_schema() -> Result<SchemaRegistry, SchemaError> {
    let mut builder = SchemaBuilder::new(SECRET_CONFIG_ROOT);
    register_secret_schema(&mut builder)?;
    builder.instantiate()
}

/// Returns the process-wide secret schema registry.
///
/// # Errors
///
/// Returns [`ConfigError::Registry`] when the registry failed to build.
pub fn secret_config_schema() -> Result<&'static SchemaRegistry, ConfigError> {
    static REGISTRY: OnceLock<Result<SchemaRegistry, SchemaError>> = OnceLock::new();
    REGISTRY.get_or_init(build_secret_schema).as_ref().map_err(|err| ConfigError::Registry(err.clone()))
}

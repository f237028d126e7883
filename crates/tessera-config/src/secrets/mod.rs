// crates/tessera-config/src/secrets/mod.rs
// ============================================================================
// Module: Secrets
// Description: Discriminated-union secret model and its document pipeline.
// Purpose: Group secret keys, payloads, schema fragments, and the store.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Secret documents have the shape `{ secrets: [ { key, data } ] }`. The
//! [`SecretKey`] of an item selects its payload type and schema fragment;
//! [`SecretConfig`] holds the decoded items with at most one per key.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod key;
pub mod payload;
pub mod schema;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::key::SecretKey;
pub use self::key::UnknownSecretKey;
pub use self::payload::AdminApiAuthKey;
pub use self::payload::AnalyticRedisCredentials;
pub use self::payload::AuditDatabaseCredentials;
pub use self::payload::BotProtectionProviderCredentials;
pub use self::payload::CsrfKeyMaterials;
pub use self::payload::DatabaseCredentials;
pub use self::payload::ElasticsearchCredentials;
pub use self::payload::ImagesKeyMaterials;
pub use self::payload::Jwk;
pub use self::payload::JwkSet;
pub use self::payload::NexmoCredentials;
pub use self::payload::OAuthClientCredentials;
pub use self::payload::OAuthClientCredentialsItem;
pub use self::payload::OAuthKeyMaterials;
pub use self::payload::OAuthSsoProviderCredentials;
pub use self::payload::OAuthSsoProviderCredentialsItem;
pub use self::payload::RedisCredentials;
pub use self::payload::SecretData;
pub use self::payload::SecretPayload;
pub use self::payload::SensitiveStrings;
pub use self::payload::SmtpMode;
pub use self::payload::SmtpServerCredentials;
pub use self::payload::TwilioCredentials;
pub use self::payload::ValidatePayload;
pub use self::payload::WebhookKeyMaterials;
pub use self::schema::SECRET_CONFIG_ROOT;
pub use self::schema::build_secret_schema;
pub use self::schema::register_secret_schema;
pub use self::schema::secret_config_schema;
pub use self::store::SECRET_CONFIG_HEADLINE;
pub use self::store::SecretConfig;
pub use self::store::SecretItem;
pub use self::store::parse_partial_secret;
pub use self::store::parse_secret_config;

// ============================================================================
// SECTION: Tests
// ============================================================================

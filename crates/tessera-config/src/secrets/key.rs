// crates/tessera-config/src/secrets/key.rs
// ============================================================================
// Module: Secret Keys
// Description: Discriminator of secret items and its static associations.
// Purpose: Bind each secret key to one payload shape and schema fragment.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`SecretKey`] is the tag of a secret item. Every key maps to exactly one
//! payload type (see [`super::payload::SecretPayload`]) and one schema
//! fragment name. Keys arriving over the wire are parsed with
//! [`SecretKey::from_str`]; unknown keys are rejected there.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Secret Key
// ============================================================================

/// Secret item discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecretKey {
    /// Primary database credentials.
    #[serde(rename = "db")]
    Database,
    /// Audit database credentials.
    #[serde(rename = "audit.db")]
    AuditDatabase,
    /// Search cluster credentials.
    #[serde(rename = "elasticsearch")]
    Elasticsearch,
    /// Cache and broker credentials.
    #[serde(rename = "redis")]
    Redis,
    /// Analytics cache credentials.
    #[serde(rename = "analytic.redis")]
    AnalyticRedis,
    /// Admin API signing keys.
    #[serde(rename = "admin-api.auth")]
    AdminApiAuth,
    /// OAuth SSO provider client secrets.
    #[serde(rename = "sso.oauth.client")]
    OAuthSsoProvider,
    /// SMTP server credentials.
    #[serde(rename = "mail.smtp")]
    Smtp,
    /// Twilio SMS credentials.
    #[serde(rename = "sms.twilio")]
    Twilio,
    /// Nexmo SMS credentials.
    #[serde(rename = "sms.nexmo")]
    Nexmo,
    /// OAuth token signing keys.
    #[serde(rename = "oauth")]
    OAuth,
    /// CSRF cookie keys.
    #[serde(rename = "csrf")]
    Csrf,
    /// Webhook request signing keys.
    #[serde(rename = "webhook")]
    Webhook,
    /// Image URL signing keys.
    #[serde(rename = "images")]
    Images,
    /// Confidential OAuth client secrets.
    #[serde(rename = "oauth.client_secrets")]
    OAuthClientSecrets,
    /// Bot protection provider secret key.
    #[serde(rename = "bot_protection.provider")]
    BotProtectionProvider,
}

impl SecretKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 16] = [
        Self::Database,
        Self::AuditDatabase,
        Self::Elasticsearch,
        Self::Redis,
        Self::AnalyticRedis,
        Self::AdminApiAuth,
        Self::OAuthSsoProvider,
        Self::Smtp,
        Self::Twilio,
        Self::Nexmo,
        Self::OAuth,
        Self::Csrf,
        Self::Webhook,
        Self::Images,
        Self::OAuthClientSecrets,
        Self::BotProtectionProvider,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "db",
            Self::AuditDatabase => "audit.db",
            Self::Elasticsearch => "elasticsearch",
            Self::Redis => "redis",
            Self::AnalyticRedis => "analytic.redis",
            Self::AdminApiAuth => "admin-api.auth",
            Self::OAuthSsoProvider => "sso.oauth.client",
            Self::Smtp => "mail.smtp",
            Self::Twilio => "sms.twilio",
            Self::Nexmo => "sms.nexmo",
            Self::OAuth => "oauth",
            Self::Csrf => "csrf",
            Self::Webhook => "webhook",
            Self::Images => "images",
            Self::OAuthClientSecrets => "oauth.client_secrets",
            Self::BotProtectionProvider => "bot_protection.provider",
        }
    }

    /// Returns the schema fragment describing this key's payload.
    #[must_use]
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Database => "DatabaseCredentials",
            Self::AuditDatabase => "AuditDatabaseCredentials",
            Self::Elasticsearch => "ElasticsearchCredentials",
            Self::Redis => "RedisCredentials",
            Self::AnalyticRedis => "AnalyticRedisCredentials",
            Self::AdminApiAuth => "AdminAPIAuthKey",
            Self::OAuthSsoProvider => "OAuthSSOProviderCredentials",
            Self::Smtp => "SMTPServerCredentials",
            Self::Twilio => "TwilioCredentials",
            Self::Nexmo => "NexmoCredentials",
            Self::OAuth => "OAuthKeyMaterials",
            Self::Csrf => "CSRFKeyMaterials",
            Self::Webhook => "WebhookKeyMaterials",
            Self::Images => "ImagesKeyMaterials",
            Self::OAuthClientSecrets => "OAuthClientCredentials",
            Self::BotProtectionProvider => "BotProtectionProviderCredentials",
        }
    }

    /// Returns a human description used in requirement messages.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Database => "database credentials",
            Self::AuditDatabase => "audit database credentials",
            Self::Elasticsearch => "elasticsearch credentials",
            Self::Redis => "redis credentials",
            Self::AnalyticRedis => "analytic redis credentials",
            Self::AdminApiAuth => "admin API auth key materials",
            Self::OAuthSsoProvider => "OAuth SSO provider client credentials",
            Self::Smtp => "SMTP server credentials",
            Self::Twilio => "Twilio credentials",
            Self::Nexmo => "Nexmo credentials",
            Self::OAuth => "OAuth key materials",
            Self::Csrf => "CSRF key materials",
            Self::Webhook => "web-hook signing key materials",
            Self::Images => "images key materials",
            Self::OAuthClientSecrets => "OAuth client credentials",
            Self::BotProtectionProvider => "bot protection key materials",
        }
    }

    /// Returns true for keys whose data an operator may patch through an
    /// update instruction carrying client-supplied values.
    #[must_use]
    pub const fn is_updatable(self) -> bool {
        matches!(self, Self::OAuthSsoProvider | Self::Smtp)
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a key with no registered payload type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown secret key: {0}")]
pub struct UnknownSecretKey(pub String);

impl FromStr for SecretKey {
    type Err = UnknownSecretKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| UnknownSecretKey(value.to_string()))
    }
}

impl PartialOrd for SecretKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keys order by wire name.
impl Ord for SecretKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

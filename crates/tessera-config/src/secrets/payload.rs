// crates/tessera-config/src/secrets/payload.rs
// ============================================================================
// Module: Secret Payloads
// Description: Typed payload for every secret key and the tagged union.
// Purpose: Decode, default, validate, and redact secret item data.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Each [`SecretKey`] owns one payload type. [`SecretPayload`] is the tagged
//! union of all of them; matches over it are exhaustive, so adding a key
//! without a payload does not compile.
//!
//! Every payload enumerates its [`SensitiveStrings`] (values that must never
//! appear unmasked) and may carry [`ValidatePayload`] rules that run after
//! defaulting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tessera_schema::ValidationContext;

use super::key::SecretKey;
use crate::app::BotProtectionProviderType;
use crate::defaults::NullableFields;
use crate::defaults::PopulateDefaults;
use crate::defaults::SetDefaults;

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// Values that must be redacted wherever a payload could be logged.
pub trait SensitiveStrings {
    /// Returns every sensitive value; empty strings are ignored by maskers.
    fn sensitive_strings(&self) -> Vec<String>;
}

/// Payload rules checked after decoding and defaulting.
pub trait ValidatePayload {
    /// Records violations below `path`, the pointer of the item's `data`.
    fn validate_payload(&self, _context: &mut ValidationContext, _path: &str) {}
}

/// A concrete payload type bound to its secret key.
pub trait SecretData:
    SensitiveStrings
    + ValidatePayload
    + PopulateDefaults
    + Serialize
    + DeserializeOwned
    + Clone
    + Into<SecretPayload>
{
    /// Key this payload is stored under.
    const KEY: SecretKey;

    /// Borrows the payload out of the union when the variant matches.
    fn from_payload(payload: &SecretPayload) -> Option<&Self>;
}

/// Binds a payload type to its union variant.
macro_rules! secret_data {
    ($ty:ty => $variant:ident) => {
        impl From<$ty> for SecretPayload {
            fn from(data: $ty) -> Self {
                Self::$variant(data)
            }
        }

        impl SecretData for $ty {
            const KEY: SecretKey = SecretKey::$variant;

            fn from_payload(payload: &SecretPayload) -> Option<&Self> {
                match payload {
                    SecretPayload::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

// ============================================================================
// SECTION: JSON Web Keys
// ============================================================================

/// JWK parameters holding private key material.
const PRIVATE_JWK_PARAMS: [&str; 7] = ["k", "d", "p", "q", "dp", "dq", "qi"];

/// A JSON Web Key; parameters beyond `kid` and `kty` are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key identifier.
    pub kid: String,
    /// Key type, e.g. `oct` or `RSA`.
    pub kty: String,
    /// Remaining parameters.
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl Jwk {
    /// Returns private key material carried by this key.
    #[must_use]
    pub fn private_material(&self) -> Vec<String> {
        PRIVATE_JWK_PARAMS
            .iter()
            .filter_map(|name| self.params.get(*name).and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }
}

/// A set of JSON Web Keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Keys in the set.
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Returns the key with the given identifier.
    #[must_use]
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    /// Emits a violation for every repeated key identifier.
    fn validate_unique_kids(keys: &[Jwk], context: &mut ValidationContext, path: &str) {
        let mut seen = BTreeSet::new();
        for (index, key) in keys.iter().enumerate() {
            if !seen.insert(key.kid.as_str()) {
                context.emit(format!("{path}/keys/{index}/kid"), format!("duplicated key id '{}'", key.kid));
            }
        }
    }
}

impl SensitiveStrings for JwkSet {
    fn sensitive_strings(&self) -> Vec<String> {
        self.keys.iter().flat_map(Jwk::private_material).collect()
    }
}

impl ValidatePayload for JwkSet {
    fn validate_payload(&self, context: &mut ValidationContext, path: &str) {
        Self::validate_unique_kids(&self.keys, context, path);
    }
}

/// Declares a key-material payload wrapping a [`JwkSet`].
macro_rules! key_materials {
    ($(#[$meta:meta])* $ty:ident => $variant:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(pub JwkSet);

        impl SetDefaults for $ty {}
        impl NullableFields for $ty {}
        crate::populate_defaults!($ty {});

        impl SensitiveStrings for $ty {
            fn sensitive_strings(&self) -> Vec<String> {
                self.0.sensitive_strings()
            }
        }

        impl ValidatePayload for $ty {
            fn validate_payload(&self, context: &mut ValidationContext, path: &str) {
                self.0.validate_payload(context, path);
            }
        }

        secret_data!($ty => $variant);
    };
}

key_materials!(
    /// Admin API signing keys; at most two are kept during rotation.
    AdminApiAuthKey => AdminApiAuth
);
key_materials!(
    /// OAuth token signing keys.
    OAuthKeyMaterials => OAuth
);
key_materials!(
    /// CSRF cookie keys.
    CsrfKeyMaterials => Csrf
);
key_materials!(
    /// Webhook request signing keys.
    WebhookKeyMaterials => Webhook
);
key_materials!(
    /// Image URL signing keys.
    ImagesKeyMaterials => Images
);

// ============================================================================
// SECTION: Connection Credentials
// ============================================================================

/// Default PostgreSQL schema.
pub const DEFAULT_DATABASE_SCHEMA: &str = "public";

/// Primary database credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCredentials {
    /// Connection URL.
    pub database_url: String,
    /// Schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_schema: Option<String>,
}

impl SetDefaults for DatabaseCredentials {
    fn set_defaults(&mut self) {
        if self.database_schema.is_none() {
            self.database_schema = Some(DEFAULT_DATABASE_SCHEMA.to_string());
        }
    }
}

impl NullableFields for DatabaseCredentials {}
crate::populate_defaults!(DatabaseCredentials {});

impl SensitiveStrings for DatabaseCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.database_url.clone()]
    }
}

impl ValidatePayload for DatabaseCredentials {}
secret_data!(DatabaseCredentials => Database);

/// Audit database credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDatabaseCredentials {
    /// Connection URL.
    pub database_url: String,
    /// Schema name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_schema: Option<String>,
}

impl SetDefaults for AuditDatabaseCredentials {
    fn set_defaults(&mut self) {
        if self.database_schema.is_none() {
            self.database_schema = Some(DEFAULT_DATABASE_SCHEMA.to_string());
        }
    }
}

impl NullableFields for AuditDatabaseCredentials {}
crate::populate_defaults!(AuditDatabaseCredentials {});

impl SensitiveStrings for AuditDatabaseCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.database_url.clone()]
    }
}

impl ValidatePayload for AuditDatabaseCredentials {}
secret_data!(AuditDatabaseCredentials => AuditDatabase);

/// Search cluster credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElasticsearchCredentials {
    /// Cluster URL.
    pub elasticsearch_url: String,
}

impl SetDefaults for ElasticsearchCredentials {}
impl NullableFields for ElasticsearchCredentials {}
crate::populate_defaults!(ElasticsearchCredentials {});

impl SensitiveStrings for ElasticsearchCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.elasticsearch_url.clone()]
    }
}

impl ValidatePayload for ElasticsearchCredentials {}
secret_data!(ElasticsearchCredentials => Elasticsearch);

/// Cache and broker credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisCredentials {
    /// Connection URL.
    pub redis_url: String,
}

impl SetDefaults for RedisCredentials {}
impl NullableFields for RedisCredentials {}
crate::populate_defaults!(RedisCredentials {});

impl SensitiveStrings for RedisCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.redis_url.clone()]
    }
}

impl ValidatePayload for RedisCredentials {}
secret_data!(RedisCredentials => Redis);

/// Analytics cache credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticRedisCredentials {
    /// Connection URL.
    pub redis_url: String,
}

impl SetDefaults for AnalyticRedisCredentials {}
impl NullableFields for AnalyticRedisCredentials {}
crate::populate_defaults!(AnalyticRedisCredentials {});

impl SensitiveStrings for AnalyticRedisCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.redis_url.clone()]
    }
}

impl ValidatePayload for AnalyticRedisCredentials {}
secret_data!(AnalyticRedisCredentials => AnalyticRedis);

// ============================================================================
// SECTION: OAuth SSO Provider Credentials
// ============================================================================

/// Client secrets of OAuth SSO providers, matched by alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSsoProviderCredentials {
    /// One entry per provider alias.
    #[serde(default)]
    pub items: Vec<OAuthSsoProviderCredentialsItem>,
}

impl OAuthSsoProviderCredentials {
    /// Returns the entry for `alias` with its index.
    #[must_use]
    pub fn lookup(&self, alias: &str) -> Option<(usize, &OAuthSsoProviderCredentialsItem)> {
        self.items.iter().enumerate().find(|(_, item)| item.alias == alias)
    }
}

/// Client secret of one OAuth SSO provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSsoProviderCredentialsItem {
    /// Provider alias.
    pub alias: String,
    /// Client secret; empty when demo credentials are used.
    #[serde(default)]
    pub client_secret: String,
}

impl SetDefaults for OAuthSsoProviderCredentials {}
impl NullableFields for OAuthSsoProviderCredentials {}
crate::populate_defaults!(OAuthSsoProviderCredentials {});

impl SensitiveStrings for OAuthSsoProviderCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        self.items.iter().map(|item| item.client_secret.clone()).collect()
    }
}

impl ValidatePayload for OAuthSsoProviderCredentials {
    fn validate_payload(&self, context: &mut ValidationContext, path: &str) {
        let mut seen = BTreeSet::new();
        for (index, item) in self.items.iter().enumerate() {
            if !seen.insert(item.alias.as_str()) {
                context.emit(
                    format!("{path}/items/{index}/alias"),
                    format!("duplicated provider alias '{}'", item.alias),
                );
            }
        }
    }
}

secret_data!(OAuthSsoProviderCredentials => OAuthSsoProvider);

// ============================================================================
// SECTION: Messaging Credentials
// ============================================================================

/// SMTP connection security.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpMode {
    /// Plain connection upgraded with STARTTLS when offered.
    #[default]
    Normal,
    /// Implicit TLS.
    Ssl,
}

/// SMTP server credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpServerCredentials {
    /// Server host name.
    pub host: String,
    /// Server port, 1 through 65535.
    pub port: i64,
    /// Connection security.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SmtpMode>,
    /// Login user name.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl SetDefaults for SmtpServerCredentials {
    fn set_defaults(&mut self) {
        if self.mode.is_none() {
            self.mode = Some(SmtpMode::Normal);
        }
    }
}

impl NullableFields for SmtpServerCredentials {}
crate::populate_defaults!(SmtpServerCredentials {});

impl SensitiveStrings for SmtpServerCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.host.clone(), self.username.clone(), self.password.clone()]
    }
}

impl ValidatePayload for SmtpServerCredentials {
    fn validate_payload(&self, context: &mut ValidationContext, path: &str) {
        if !(1 ..= 65_535).contains(&self.port) {
            context.emit(format!("{path}/port"), format!("port {} must be within 1..65535", self.port));
        }
    }
}

secret_data!(SmtpServerCredentials => Smtp);

/// Twilio credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwilioCredentials {
    /// Account SID.
    pub account_sid: String,
    /// Auth token.
    pub auth_token: String,
}

impl SetDefaults for TwilioCredentials {}
impl NullableFields for TwilioCredentials {}
crate::populate_defaults!(TwilioCredentials {});

impl SensitiveStrings for TwilioCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.account_sid.clone(), self.auth_token.clone()]
    }
}

impl ValidatePayload for TwilioCredentials {}
secret_data!(TwilioCredentials => Twilio);

/// Nexmo credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexmoCredentials {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
}

impl SetDefaults for NexmoCredentials {}
impl NullableFields for NexmoCredentials {}
crate::populate_defaults!(NexmoCredentials {});

impl SensitiveStrings for NexmoCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.api_key.clone(), self.api_secret.clone()]
    }
}

impl ValidatePayload for NexmoCredentials {}
secret_data!(NexmoCredentials => Nexmo);

// ============================================================================
// SECTION: OAuth Client Credentials
// ============================================================================

/// Secrets of confidential OAuth clients, matched by client ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthClientCredentials {
    /// One entry per confidential client.
    #[serde(default)]
    pub items: Vec<OAuthClientCredentialsItem>,
}

impl OAuthClientCredentials {
    /// Returns the entry for `client_id`.
    #[must_use]
    pub fn lookup(&self, client_id: &str) -> Option<&OAuthClientCredentialsItem> {
        self.items.iter().find(|item| item.client_id == client_id)
    }
}

/// Key set of one confidential client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthClientCredentialsItem {
    /// Client identifier.
    pub client_id: String,
    /// Secret keys of the client.
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

impl SetDefaults for OAuthClientCredentials {}
impl NullableFields for OAuthClientCredentials {}
crate::populate_defaults!(OAuthClientCredentials {});

impl SensitiveStrings for OAuthClientCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        self.items.iter().flat_map(|item| item.keys.iter().flat_map(Jwk::private_material)).collect()
    }
}

impl ValidatePayload for OAuthClientCredentials {
    fn validate_payload(&self, context: &mut ValidationContext, path: &str) {
        let mut seen = BTreeSet::new();
        for (index, item) in self.items.iter().enumerate() {
            let item_path = format!("{path}/items/{index}");
            if !seen.insert(item.client_id.as_str()) {
                context.emit(
                    format!("{item_path}/client_id"),
                    format!("duplicated client id '{}'", item.client_id),
                );
            }
            JwkSet::validate_unique_kids(&item.keys, context, &item_path);
        }
    }
}

secret_data!(OAuthClientCredentials => OAuthClientSecrets);

// ============================================================================
// SECTION: Bot Protection Credentials
// ============================================================================

/// Server-side secret of the bot protection provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotProtectionProviderCredentials {
    /// Provider kind the secret belongs to.
    #[serde(rename = "type")]
    pub provider_type: BotProtectionProviderType,
    /// Secret key issued by the provider.
    pub secret_key: String,
}

impl SetDefaults for BotProtectionProviderCredentials {}
impl NullableFields for BotProtectionProviderCredentials {}
crate::populate_defaults!(BotProtectionProviderCredentials {});

impl SensitiveStrings for BotProtectionProviderCredentials {
    fn sensitive_strings(&self) -> Vec<String> {
        vec![self.secret_key.clone()]
    }
}

impl ValidatePayload for BotProtectionProviderCredentials {}
secret_data!(BotProtectionProviderCredentials => BotProtectionProvider);

// ============================================================================
// SECTION: Tagged Union
// ============================================================================

/// Decoded payload of a secret item.
#[derive(Debug, Clone, PartialEq)]
pub enum SecretPayload {
    /// `db`
    Database(DatabaseCredentials),
    /// `audit.db`
    AuditDatabase(AuditDatabaseCredentials),
    /// `elasticsearch`
    Elasticsearch(ElasticsearchCredentials),
    /// `redis`
    Redis(RedisCredentials),
    /// `analytic.redis`
    AnalyticRedis(AnalyticRedisCredentials),
    /// `admin-api.auth`
    AdminApiAuth(AdminApiAuthKey),
    /// `sso.oauth.client`
    OAuthSsoProvider(OAuthSsoProviderCredentials),
    /// `mail.smtp`
    Smtp(SmtpServerCredentials),
    /// `sms.twilio`
    Twilio(TwilioCredentials),
    /// `sms.nexmo`
    Nexmo(NexmoCredentials),
    /// `oauth`
    OAuth(OAuthKeyMaterials),
    /// `csrf`
    Csrf(CsrfKeyMaterials),
    /// `webhook`
    Webhook(WebhookKeyMaterials),
    /// `images`
    Images(ImagesKeyMaterials),
    /// `oauth.client_secrets`
    OAuthClientSecrets(OAuthClientCredentials),
    /// `bot_protection.provider`
    BotProtectionProvider(BotProtectionProviderCredentials),
}

/// Evaluates `$body` with `$data` bound to the payload of any variant.
macro_rules! with_payload {
    ($payload:expr, $data:ident => $body:expr) => {
        match $payload {
            SecretPayload::Database($data) => $body,
            SecretPayload::AuditDatabase($data) => $body,
            SecretPayload::Elasticsearch($data) => $body,
            SecretPayload::Redis($data) => $body,
            SecretPayload::AnalyticRedis($data) => $body,
            SecretPayload::AdminApiAuth($data) => $body,
            SecretPayload::OAuthSsoProvider($data) => $body,
            SecretPayload::Smtp($data) => $body,
            SecretPayload::Twilio($data) => $body,
            SecretPayload::Nexmo($data) => $body,
            SecretPayload::OAuth($data) => $body,
            SecretPayload::Csrf($data) => $body,
            SecretPayload::Webhook($data) => $body,
            SecretPayload::Images($data) => $body,
            SecretPayload::OAuthClientSecrets($data) => $body,
            SecretPayload::BotProtectionProvider($data) => $body,
        }
    };
}

impl SecretPayload {
    /// Returns the key of this payload's variant.
    #[must_use]
    pub const fn key(&self) -> SecretKey {
        match self {
            Self::Database(_) => SecretKey::Database,
            Self::AuditDatabase(_) => SecretKey::AuditDatabase,
            Self::Elasticsearch(_) => SecretKey::Elasticsearch,
            Self::Redis(_) => SecretKey::Redis,
            Self::AnalyticRedis(_) => SecretKey::AnalyticRedis,
            Self::AdminApiAuth(_) => SecretKey::AdminApiAuth,
            Self::OAuthSsoProvider(_) => SecretKey::OAuthSsoProvider,
            Self::Smtp(_) => SecretKey::Smtp,
            Self::Twilio(_) => SecretKey::Twilio,
            Self::Nexmo(_) => SecretKey::Nexmo,
            Self::OAuth(_) => SecretKey::OAuth,
            Self::Csrf(_) => SecretKey::Csrf,
            Self::Webhook(_) => SecretKey::Webhook,
            Self::Images(_) => SecretKey::Images,
            Self::OAuthClientSecrets(_) => SecretKey::OAuthClientSecrets,
            Self::BotProtectionProvider(_) => SecretKey::BotProtectionProvider,
        }
    }

    /// Decodes raw item data as the payload registered for `key`.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when `raw` does not fit the payload shape.
    pub fn decode(key: SecretKey, raw: &Value) -> Result<Self, serde_json::Error> {
        match key {
            SecretKey::Database => decode_as::<DatabaseCredentials>(raw),
            SecretKey::AuditDatabase => decode_as::<AuditDatabaseCredentials>(raw),
            SecretKey::Elasticsearch => decode_as::<ElasticsearchCredentials>(raw),
            SecretKey::Redis => decode_as::<RedisCredentials>(raw),
            SecretKey::AnalyticRedis => decode_as::<AnalyticRedisCredentials>(raw),
            SecretKey::AdminApiAuth => decode_as::<AdminApiAuthKey>(raw),
            SecretKey::OAuthSsoProvider => decode_as::<OAuthSsoProviderCredentials>(raw),
            SecretKey::Smtp => decode_as::<SmtpServerCredentials>(raw),
            SecretKey::Twilio => decode_as::<TwilioCredentials>(raw),
            SecretKey::Nexmo => decode_as::<NexmoCredentials>(raw),
            SecretKey::OAuth => decode_as::<OAuthKeyMaterials>(raw),
            SecretKey::Csrf => decode_as::<CsrfKeyMaterials>(raw),
            SecretKey::Webhook => decode_as::<WebhookKeyMaterials>(raw),
            SecretKey::Images => decode_as::<ImagesKeyMaterials>(raw),
            SecretKey::OAuthClientSecrets => decode_as::<OAuthClientCredentials>(raw),
            SecretKey::BotProtectionProvider => decode_as::<BotProtectionProviderCredentials>(raw),
        }
    }

    /// Returns the values to redact.
    #[must_use]
    pub fn sensitive_strings(&self) -> Vec<String> {
        with_payload!(self, data => data.sensitive_strings())
    }

    /// Runs the payload's own rules.
    pub fn validate(&self, context: &mut ValidationContext, path: &str) {
        with_payload!(self, data => data.validate_payload(context, path));
    }

    /// Serializes the payload data.
    ///
    /// # Errors
    ///
    /// Returns the serializer error.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        with_payload!(self, data => serde_json::to_value(data))
    }
}

impl PopulateDefaults for SecretPayload {
    fn populate_defaults(&mut self) {
        with_payload!(self, data => data.populate_defaults());
    }
}

/// Decodes `raw` as `T` and wraps it in the union.
fn decode_as<T: SecretData>(raw: &Value) -> Result<SecretPayload, serde_json::Error> {
    T::deserialize(raw).map(Into::into)
}

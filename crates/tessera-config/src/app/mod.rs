// crates/tessera-config/src/app/mod.rs
// ============================================================================
// Module: Application Config
// Description: Typed application configuration tree and its parse pipeline.
// Purpose: Turn operator-authored YAML into a validated, defaulted snapshot.
// Dependencies: serde, serde_json, serde_yaml, tessera-schema, tracing
// ============================================================================

//! ## Overview
//! [`AppConfig`] is the root of the application configuration tree. Each
//! submodule owns a slice of the tree together with the schema fragments that
//! describe it; [`register_app_schema`] collects them into one builder.
//!
//! [`parse_app_config`] runs the full pipeline:
//! YAML text, schema validation, typed decode, defaulting, then the
//! cross-field rules of [`AppConfig::validate`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authentication;
pub mod bot_protection;
pub mod hook;
pub mod http;
pub mod identity;
pub mod localization;
pub mod oauth;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;
use tessera_schema::SchemaRegistry;
use tessera_schema::ValidationContext;
use tessera_schema::ValidationError;
use tessera_schema::Violation;
use tessera_schema::fragment_ref;

pub use self::authentication::AuthenticationConfig;
pub use self::bot_protection::BotProtectionConfig;
pub use self::bot_protection::BotProtectionProvider;
pub use self::bot_protection::BotProtectionProviderType;
pub use self::hook::BlockingHandlerConfig;
pub use self::hook::HookConfig;
pub use self::hook::NonBlockingHandlerConfig;
pub use self::http::HttpConfig;
pub use self::identity::CredentialsBehavior;
pub use self::identity::IdentityConfig;
pub use self::identity::LoginIdConfig;
pub use self::identity::LoginIdKeyConfig;
pub use self::identity::LoginIdKeyType;
pub use self::identity::OAuthSsoConfig;
pub use self::identity::OAuthSsoProviderConfig;
pub use self::localization::DEFAULT_FALLBACK_LANGUAGE;
pub use self::localization::LocalizationConfig;
pub use self::oauth::ApplicationType;
pub use self::oauth::DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS;
pub use self::oauth::DEFAULT_REFRESH_TOKEN_LIFETIME_SECONDS;
pub use self::oauth::OAuthClientConfig;
pub use self::oauth::OAuthConfig;
use crate::defaults::NullableFields;
use crate::defaults::SetDefaults;
use crate::defaults::apply_defaults;
use crate::error::ConfigError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root fragment of the application schema.
pub const APP_CONFIG_ROOT: &str = "AppConfig";
/// Headline of application config errors.
pub const APP_CONFIG_HEADLINE: &str = "invalid configuration";

// ============================================================================
// SECTION: App Config
// ============================================================================

/// Root of the application configuration tree.
///
/// # Invariants
/// - Snapshots returned by [`parse_app_config`] are validated and defaulted.
/// - `bot_protection` stays absent unless the document declares it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application identifier.
    pub id: String,
    /// HTTP settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpConfig>,
    /// Webhook settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookConfig>,
    /// Localization settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<LocalizationConfig>,
    /// Identity settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,
    /// OAuth client settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth: Option<OAuthConfig>,
    /// Authentication settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationConfig>,
    /// Bot protection settings; absent means not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_protection: Option<BotProtectionConfig>,
}

impl SetDefaults for AppConfig {}

impl NullableFields for AppConfig {
    const NULLABLE_FIELDS: &'static [&'static str] = &["bot_protection"];
}

crate::populate_defaults!(AppConfig {
    http,
    hook,
    localization,
    identity,
    oauth,
    authentication,
    bot_protection,
});

impl AppConfig {
    /// Returns the configured OAuth SSO providers.
    #[must_use]
    pub fn oauth_providers(&self) -> &[OAuthSsoProviderConfig] {
        self.identity.as_ref().map(IdentityConfig::oauth_providers).unwrap_or_default()
    }

    /// Returns the registered OAuth clients.
    #[must_use]
    pub fn oauth_clients(&self) -> &[OAuthClientConfig] {
        self.oauth.as_ref().map(|oauth| oauth.clients.as_slice()).unwrap_or_default()
    }

    /// Returns true when any webhook handler is configured.
    #[must_use]
    pub fn has_hook_handlers(&self) -> bool {
        self.hook.as_ref().is_some_and(HookConfig::has_handlers)
    }

    /// Returns the bot protection provider when protection is enabled.
    #[must_use]
    pub fn enabled_bot_protection_provider(&self) -> Option<&BotProtectionProvider> {
        self.bot_protection
            .as_ref()
            .filter(|bot_protection| bot_protection.enabled)
            .and_then(|bot_protection| bot_protection.provider.as_ref())
    }

    /// Checks cross-field rules that the schema cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut context = ValidationContext::new();
        self.validate_oauth_clients(&mut context);
        self.validate_oauth_providers(&mut context);
        self.validate_login_id_keys(&mut context);
        self.validate_localization(&mut context);
        context.finish(APP_CONFIG_HEADLINE)
    }

    /// Refresh tokens must outlive access tokens.
    fn validate_oauth_clients(&self, context: &mut ValidationContext) {
        for (index, client) in self.oauth_clients().iter().enumerate() {
            if let (Some(access), Some(refresh)) =
                (client.access_token_lifetime_seconds, client.refresh_token_lifetime_seconds)
                && refresh < access
            {
                context.emit(
                    format!("/oauth/clients/{index}/refresh_token_lifetime_seconds"),
                    format!(
                        "refresh token lifetime must be greater than or equal to access token lifetime ({access})"
                    ),
                );
            }
        }
    }

    /// Provider aliases must be unique.
    fn validate_oauth_providers(&self, context: &mut ValidationContext) {
        let mut seen = BTreeSet::new();
        for (index, provider) in self.oauth_providers().iter().enumerate() {
            if !seen.insert(provider.alias.as_str()) {
                context.emit(
                    format!("/identity/oauth/providers/{index}/alias"),
                    format!("duplicated OAuth provider alias '{}'", provider.alias),
                );
            }
        }
    }

    /// Login ID key names must be unique.
    fn validate_login_id_keys(&self, context: &mut ValidationContext) {
        let keys = self
            .identity
            .as_ref()
            .and_then(|identity| identity.login_id.as_ref())
            .map(|login_id| login_id.keys.as_slice())
            .unwrap_or_default();
        let mut seen = BTreeSet::new();
        for (index, key) in keys.iter().enumerate() {
            if !seen.insert(key.key()) {
                context.emit(
                    format!("/identity/login_id/keys/{index}/key"),
                    format!("duplicated login ID key '{}'", key.key()),
                );
            }
        }
    }

    /// The fallback language must be supported.
    fn validate_localization(&self, context: &mut ValidationContext) {
        if let Some(localization) = &self.localization {
            let fallback = localization.fallback_language();
            if !localization.supported_languages.iter().any(|language| language == fallback) {
                context.emit(
                    "/localization/supported_languages",
                    format!("supported_languages must contain fallback language '{fallback}'"),
                );
            }
        }
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers every application config fragment.
///
/// # Errors
///
/// Returns [`SchemaError::DuplicateFragment`] when a fragment name collides.
pub fn register_app_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        APP_CONFIG_ROOT,
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "id": { "type": "string", "minLength": 1 },
                "http": fragment_ref("HTTPConfig"),
                "hook": fragment_ref("HookConfig"),
                "localization": fragment_ref("LocalizationConfig"),
                "identity": fragment_ref("IdentityConfig"),
                "oauth": fragment_ref("OAuthConfig"),
                "authentication": fragment_ref("AuthenticationConfig"),
                "bot_protection": fragment_ref("BotProtectionConfig")
            },
            "required": ["id"]
        }),
    )?;
    http::register_schema(builder)?;
    hook::register_schema(builder)?;
    localization::register_schema(builder)?;
    identity::register_schema(builder)?;
    oauth::register_schema(builder)?;
    authentication::register_schema(builder)?;
    bot_protection::register_schema(builder)
}

/// Builds a fresh application schema registry.
///
/// # Errors
///
/// Returns [`SchemaError`] when fragments collide or fail to compile.
pub fn build_app_schema() -> Result<SchemaRegistry, SchemaError> {
    let mut builder = SchemaBuilder::new(APP_CONFIG_ROOT);
    register_app_schema(&mut builder)?;
    builder.instantiate()
}

/// Returns the process-wide application schema registry.
///
/// # Errors
///
/// Returns [`ConfigError::Registry`] when the registry failed to build.
pub fn app_config_schema() -> Result<&'static SchemaRegistry, ConfigError> {
    static REGISTRY: OnceLock<Result<SchemaRegistry, SchemaError>> = OnceLock::new();
    REGISTRY.get_or_init(build_app_schema).as_ref().map_err(|err| ConfigError::Registry(err.clone()))
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses YAML (or JSON) text into a JSON tree.
pub(crate) fn parse_document(text: &str) -> Result<Value, ConfigError> {
    let value: Value = serde_yaml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
    Ok(if value.is_null() { json!({}) } else { value })
}

/// Parses, validates, decodes, and defaults an application config.
///
/// # Errors
///
/// Returns [`ConfigError`] for the first failing stage; document stages
/// report every violation of that stage.
pub fn parse_app_config(text: &str) -> Result<AppConfig, ConfigError> {
    let document = parse_document(text)?;
    app_config_schema()?
        .validate_with_message(&document, APP_CONFIG_HEADLINE)
        .map_err(ConfigError::Schema)?;
    let mut config: AppConfig = serde_json::from_value(document).map_err(|err| {
        ConfigError::Decode(ValidationError::new(APP_CONFIG_HEADLINE, vec![Violation::new("", err.to_string())]))
    })?;
    apply_defaults(&mut config);
    config.validate().map_err(ConfigError::Validation)?;
    tracing::debug!(
        app_id = %config.id,
        oauth_providers = config.oauth_providers().len(),
        oauth_clients = config.oauth_clients().len(),
        "parsed app config"
    );
    Ok(config)
}

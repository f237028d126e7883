// crates/tessera-config/src/validator.rs
// ============================================================================
// Module: Secret Validator
// Description: Cross-checks a secret snapshot against the app configuration.
// Purpose: Enforce "feature enabled implies secret present" rules.
// Dependencies: tessera-schema
// ============================================================================

//! ## Overview
//! [`SecretValidator`] inspects an [`AppConfig`] and reports every secret the
//! enabled features need but the [`SecretConfig`] lacks. Violations
//! accumulate; validation never stops at the first failure.
//!
//! Always required: `db`, `redis`, `admin-api.auth`. Conditionally required:
//! - OAuth SSO providers need one `sso.oauth.client` entry per alias, with a
//!   non-empty secret unless the provider uses demo credentials;
//! - confidential OAuth clients need one `oauth.client_secrets` entry each;
//! - webhook handlers need `webhook` signing keys;
//! - enabled bot protection needs `bot_protection.provider` of the same type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use tessera_schema::ValidationError;
use tessera_schema::Violation;

use crate::app::AppConfig;
use crate::app::BotProtectionProvider;
use crate::app::CredentialsBehavior;
use crate::app::OAuthClientConfig;
use crate::error::ConfigError;
use crate::secrets::BotProtectionProviderCredentials;
use crate::secrets::OAuthClientCredentials;
use crate::secrets::OAuthSsoProviderCredentials;
use crate::secrets::SecretConfig;
use crate::secrets::SecretData;
use crate::secrets::SecretKey;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Keys every deployment needs regardless of enabled features.
pub const ALWAYS_REQUIRED: [SecretKey; 3] = [SecretKey::Database, SecretKey::Redis, SecretKey::AdminApiAuth];

/// Headline of aggregated cross-check errors.
pub const SECRET_VALIDATION_HEADLINE: &str = "invalid secrets";

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Location of a cross-check violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ViolationPath {
    /// A whole secret item, rendered as its wire key.
    Key(SecretKey),
    /// One entry inside an item's `data.items` list.
    Item {
        /// Position of the secret item.
        secret_index: usize,
        /// Position of the entry inside `data.items`.
        item_index: usize,
    },
}

impl fmt::Display for ViolationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key.as_str()),
            Self::Item {
                secret_index,
                item_index,
            } => write!(f, "/secrets/{secret_index}/data/items/{item_index}"),
        }
    }
}

/// A missing or incomplete secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretViolation {
    /// Where the problem is.
    pub path: ViolationPath,
    /// What is missing.
    pub message: String,
}

impl SecretViolation {
    /// Converts to a schema-level violation with a rendered path.
    #[must_use]
    pub fn to_violation(&self) -> Violation {
        Violation::new(self.path.to_string(), self.message.clone())
    }
}

impl fmt::Display for SecretViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Checks secret completeness for one application config.
#[derive(Debug, Clone, Copy)]
pub struct SecretValidator<'a> {
    /// Configuration whose features drive the requirements.
    app: &'a AppConfig,
}

impl<'a> SecretValidator<'a> {
    /// Creates a validator for `app`.
    #[must_use]
    pub const fn new(app: &'a AppConfig) -> Self {
        Self {
            app,
        }
    }

    /// Returns every violation, in rule order.
    #[must_use]
    pub fn validate(&self, secrets: &SecretConfig) -> Vec<SecretViolation> {
        let mut violations = Vec::new();
        for key in ALWAYS_REQUIRED {
            require(secrets, key, &mut violations);
        }
        if !self.app.oauth_providers().is_empty() {
            self.check_oauth_providers(secrets, &mut violations);
        }
        let confidential: Vec<&OAuthClientConfig> =
            self.app.oauth_clients().iter().filter(|client| client.is_confidential()).collect();
        if !confidential.is_empty() {
            check_confidential_clients(secrets, &confidential, &mut violations);
        }
        if self.app.has_hook_handlers() {
            require(secrets, SecretKey::Webhook, &mut violations);
        }
        if let Some(provider) = self.app.enabled_bot_protection_provider() {
            check_bot_protection(secrets, provider, &mut violations);
        }
        violations
    }

    /// Returns an aggregate error when any violation exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] listing every violation.
    pub fn check(&self, secrets: &SecretConfig) -> Result<(), ConfigError> {
        let violations = self.validate(secrets);
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(violations = violations.len(), "secret config failed cross-check");
        Err(ConfigError::Validation(ValidationError::new(
            SECRET_VALIDATION_HEADLINE,
            violations.iter().map(SecretViolation::to_violation).collect(),
        )))
    }

    /// Every provider alias needs a secret entry.
    fn check_oauth_providers(&self, secrets: &SecretConfig, violations: &mut Vec<SecretViolation>) {
        let found = secrets.find(OAuthSsoProviderCredentials::KEY);
        for provider in self.app.oauth_providers() {
            let matched = found.and_then(|(secret_index, item)| {
                item.data::<OAuthSsoProviderCredentials>()
                    .and_then(|data| data.lookup(&provider.alias))
                    .map(|(item_index, entry)| (secret_index, item_index, entry))
            });
            match matched {
                None => violations.push(SecretViolation {
                    path: ViolationPath::Key(OAuthSsoProviderCredentials::KEY),
                    message: format!("OAuth client credentials for '{}' is required", provider.alias),
                }),
                Some((secret_index, item_index, entry))
                    if entry.client_secret.is_empty()
                        && provider.credentials_behavior() == CredentialsBehavior::UseProjectCredentials =>
                {
                    violations.push(SecretViolation {
                        path: ViolationPath::Item {
                            secret_index,
                            item_index,
                        },
                        message: "client_secret is required".to_string(),
                    });
                }
                Some(_) => {}
            }
        }
    }
}

/// Emits a violation when `key` is absent.
fn require(secrets: &SecretConfig, key: SecretKey, violations: &mut Vec<SecretViolation>) {
    if secrets.lookup(key).is_none() {
        violations.push(SecretViolation {
            path: ViolationPath::Key(key),
            message: format!("{} (secret '{key}') is required", key.description()),
        });
    }
}

/// Every confidential client needs a key set.
fn check_confidential_clients(
    secrets: &SecretConfig,
    clients: &[&OAuthClientConfig],
    violations: &mut Vec<SecretViolation>,
) {
    let Some(credentials) = secrets.lookup_data::<OAuthClientCredentials>() else {
        require(secrets, OAuthClientCredentials::KEY, violations);
        return;
    };
    for client in clients {
        if credentials.lookup(&client.client_id).is_none() {
            violations.push(SecretViolation {
                path: ViolationPath::Key(OAuthClientCredentials::KEY),
                message: format!("OAuth client secret for '{}' is required", client.client_id),
            });
        }
    }
}

/// The stored secret must belong to the selected provider.
fn check_bot_protection(
    secrets: &SecretConfig,
    provider: &BotProtectionProvider,
    violations: &mut Vec<SecretViolation>,
) {
    let Some(credentials) = secrets.lookup_data::<BotProtectionProviderCredentials>() else {
        require(secrets, BotProtectionProviderCredentials::KEY, violations);
        return;
    };
    if credentials.provider_type != provider.provider_type {
        violations.push(SecretViolation {
            path: ViolationPath::Key(BotProtectionProviderCredentials::KEY),
            message: format!("bot protection provider credentials for '{}' is required", provider.provider_type),
        });
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;

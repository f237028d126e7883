// crates/tessera-config/src/update/instructions.rs
// ============================================================================
// Module: Update Instructions
// Description: Declarative set/unset/generate patches over secret snapshots.
// Purpose: Produce a new secret snapshot without touching the current one.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! Each instruction kind carries only the data it needs and accepts a fixed
//! set of actions; any other action fails with
//! [`ConfigError::Instruction`]. Application always starts from the current
//! snapshot and returns a new one built with
//! [`SecretConfig::with_item`] or [`SecretConfig::without`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::context::UpdateInstructionContext;
use crate::app::BotProtectionProviderType;
use crate::error::ConfigError;
use crate::secrets::AdminApiAuthKey;
use crate::secrets::BotProtectionProviderCredentials;
use crate::secrets::JwkSet;
use crate::secrets::OAuthClientCredentials;
use crate::secrets::OAuthClientCredentialsItem;
use crate::secrets::OAuthSsoProviderCredentials;
use crate::secrets::OAuthSsoProviderCredentialsItem;
use crate::secrets::SecretConfig;
use crate::secrets::SecretData;
use crate::secrets::SecretItem;
use crate::secrets::SmtpServerCredentials;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Most admin API keys kept at once; two allow rotation without downtime.
pub const MAX_ADMIN_API_KEYS: usize = 2;

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Action requested by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionAction {
    /// Replace or insert data.
    Set,
    /// Remove data; no-op when absent.
    Unset,
    /// Mint new key material.
    Generate,
    /// Drop entries not listed as kept.
    Cleanup,
    /// Remove one key.
    Delete,
}

impl InstructionAction {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Unset => "unset",
            Self::Generate => "generate",
            Self::Cleanup => "cleanup",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for InstructionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Capability
// ============================================================================

/// A patch over a secret snapshot.
pub trait ApplyInstruction {
    /// Wire name of the instruction.
    const NAME: &'static str;

    /// Returns the requested action.
    fn action(&self) -> InstructionAction;

    /// Builds the patched snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Instruction`] for unsupported actions or data
    /// that cannot be applied.
    fn apply(&self, context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError>;

    /// Error for an action this instruction does not support.
    fn unexpected_action(&self) -> ConfigError {
        ConfigError::Instruction(format!("unexpected action for {}: {}", Self::NAME, self.action()))
    }
}

/// Error for a missing data block.
fn missing(name: &str, field: &str) -> ConfigError {
    ConfigError::Instruction(format!("{name}: missing {field}"))
}

// ============================================================================
// SECTION: OAuth SSO Provider Client Secrets
// ============================================================================

/// Replaces the provider client secrets list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OAuthSsoProviderCredentialsInstruction {
    /// Requested action; only `set` is supported.
    pub action: InstructionAction,
    /// Desired entries; empty removes the secret item.
    #[serde(default)]
    pub data: Vec<OAuthSsoProviderCredentialsUpdate>,
}

/// Desired state of one provider secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OAuthSsoProviderCredentialsUpdate {
    /// Alias of an existing entry; absent for new entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_alias: Option<String>,
    /// Alias after the update.
    pub new_alias: String,
    /// New secret; absent keeps the existing one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_client_secret: Option<String>,
}

impl ApplyInstruction for OAuthSsoProviderCredentialsInstruction {
    const NAME: &'static str = "oauthSSOProviderClientSecrets";

    fn action(&self) -> InstructionAction {
        self.action
    }

    fn apply(&self, _context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        if self.action != InstructionAction::Set {
            return Err(self.unexpected_action());
        }
        if self.data.is_empty() {
            return Ok(current.without(OAuthSsoProviderCredentials::KEY));
        }
        let existing: &[OAuthSsoProviderCredentialsItem] = current
            .lookup_data::<OAuthSsoProviderCredentials>()
            .map(|credentials| credentials.items.as_slice())
            .unwrap_or_default();
        let mut items = Vec::with_capacity(self.data.len());
        for update in &self.data {
            let client_secret = match &update.original_alias {
                None => update
                    .new_client_secret
                    .clone()
                    .ok_or_else(|| missing(Self::NAME, &format!("client secret for new alias '{}'", update.new_alias)))?,
                Some(original_alias) => {
                    let original = existing.iter().find(|item| &item.alias == original_alias).ok_or_else(|| {
                        ConfigError::Instruction(format!(
                            "{}: original client secret item '{original_alias}' not found",
                            Self::NAME
                        ))
                    })?;
                    update.new_client_secret.clone().unwrap_or_else(|| original.client_secret.clone())
                }
            };
            items.push(OAuthSsoProviderCredentialsItem {
                alias: update.new_alias.clone(),
                client_secret,
            });
        }
        let item = SecretItem::from_data(OAuthSsoProviderCredentials {
            items,
        })?;
        Ok(current.with_item(item))
    }
}

// ============================================================================
// SECTION: SMTP Secret
// ============================================================================

/// Sets or removes the SMTP server credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SmtpCredentialsInstruction {
    /// `set` or `unset`.
    pub action: InstructionAction,
    /// Credentials for `set`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SmtpCredentialsUpdate>,
}

/// SMTP credentials carried by a `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SmtpCredentialsUpdate {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: i64,
    /// Login user name.
    #[serde(default)]
    pub username: String,
    /// Login password.
    #[serde(default)]
    pub password: String,
}

impl ApplyInstruction for SmtpCredentialsInstruction {
    const NAME: &'static str = "smtpSecret";

    fn action(&self) -> InstructionAction {
        self.action
    }

    fn apply(&self, _context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        match self.action {
            InstructionAction::Set => {
                let data = self.data.as_ref().ok_or_else(|| missing(Self::NAME, "data"))?;
                let item = SecretItem::from_data(SmtpServerCredentials {
                    host: data.host.clone(),
                    port: data.port,
                    mode: None,
                    username: data.username.clone(),
                    password: data.password.clone(),
                })?;
                Ok(current.with_item(item))
            }
            InstructionAction::Unset => Ok(current.without(SmtpServerCredentials::KEY)),
            InstructionAction::Generate | InstructionAction::Cleanup | InstructionAction::Delete => {
                Err(self.unexpected_action())
            }
        }
    }
}

// ============================================================================
// SECTION: OAuth Client Secrets
// ============================================================================

/// Mints or prunes confidential client secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OAuthClientSecretsInstruction {
    /// `generate` or `cleanup`.
    pub action: InstructionAction,
    /// Client to mint a secret for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_data: Option<OAuthClientSecretsGenerateData>,
    /// Clients whose secrets are kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_data: Option<OAuthClientSecretsCleanupData>,
}

/// Data of a `generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthClientSecretsGenerateData {
    /// Client identifier.
    #[serde(rename = "clientID")]
    pub client_id: String,
}

/// Data of a `cleanup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OAuthClientSecretsCleanupData {
    /// Client identifiers to keep.
    #[serde(rename = "keepClientIDs")]
    pub keep_client_ids: Vec<String>,
}

impl OAuthClientSecretsInstruction {
    /// Appends a freshly minted key set for one client.
    fn generate(&self, context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        let client_id = self
            .generate_data
            .as_ref()
            .map(|data| data.client_id.as_str())
            .filter(|client_id| !client_id.is_empty())
            .ok_or_else(|| missing(Self::NAME, "generateData.clientID"))?;
        let mut credentials = current.lookup_data::<OAuthClientCredentials>().cloned().unwrap_or_default();
        if credentials.lookup(client_id).is_some() {
            return Err(ConfigError::Instruction(format!(
                "{}: client secret already exists for '{client_id}'",
                Self::NAME
            )));
        }
        credentials.items.push(OAuthClientCredentialsItem {
            client_id: client_id.to_string(),
            keys: vec![context.keys().generate_client_secret_key(context.now())],
        });
        Ok(current.with_item(SecretItem::from_data(credentials)?))
    }

    /// Keeps only the listed clients; removes the item when none remain.
    fn cleanup(&self, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        let data = self.cleanup_data.as_ref().ok_or_else(|| missing(Self::NAME, "cleanupData.keepClientIDs"))?;
        let Some(existing) = current.lookup_data::<OAuthClientCredentials>() else {
            return Ok(current.clone());
        };
        let keep: BTreeSet<&str> = data.keep_client_ids.iter().map(String::as_str).collect();
        let items: Vec<OAuthClientCredentialsItem> =
            existing.items.iter().filter(|item| keep.contains(item.client_id.as_str())).cloned().collect();
        if items.is_empty() {
            return Ok(current.without(OAuthClientCredentials::KEY));
        }
        Ok(current.with_item(SecretItem::from_data(OAuthClientCredentials {
            items,
        })?))
    }
}

impl ApplyInstruction for OAuthClientSecretsInstruction {
    const NAME: &'static str = "oauthClientSecrets";

    fn action(&self) -> InstructionAction {
        self.action
    }

    fn apply(&self, context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        match self.action {
            InstructionAction::Generate => self.generate(context, current),
            InstructionAction::Cleanup => self.cleanup(current),
            InstructionAction::Set | InstructionAction::Unset | InstructionAction::Delete => {
                Err(self.unexpected_action())
            }
        }
    }
}

// ============================================================================
// SECTION: Admin API Auth Key
// ============================================================================

/// Rotates admin API signing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AdminApiAuthKeyInstruction {
    /// `generate` or `delete`.
    pub action: InstructionAction,
    /// Key to delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_data: Option<AdminApiAuthKeyDeleteData>,
}

/// Data of a `delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminApiAuthKeyDeleteData {
    /// Identifier of the key to delete.
    #[serde(rename = "keyID")]
    pub key_id: String,
}

impl AdminApiAuthKeyInstruction {
    /// Adds a minted key, keeping at most [`MAX_ADMIN_API_KEYS`].
    fn generate(context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        let mut keys = current.lookup_data::<AdminApiAuthKey>().cloned().unwrap_or_default();
        keys.0.keys.push(context.keys().generate_admin_api_key(context.now()));
        if keys.0.keys.len() > MAX_ADMIN_API_KEYS {
            return Err(ConfigError::Instruction(format!(
                "{}: must have at most {MAX_ADMIN_API_KEYS} admin API auth keys",
                Self::NAME
            )));
        }
        Ok(current.with_item(SecretItem::from_data(keys)?))
    }

    /// Removes one key; at least one must remain.
    fn delete(&self, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        let key_id = self
            .delete_data
            .as_ref()
            .map(|data| data.key_id.as_str())
            .filter(|key_id| !key_id.is_empty())
            .ok_or_else(|| missing(Self::NAME, "deleteData.keyID"))?;
        let Some(existing) = current.lookup_data::<AdminApiAuthKey>() else {
            return Ok(current.clone());
        };
        let remaining = JwkSet {
            keys: existing.0.keys.iter().filter(|key| key.kid != key_id).cloned().collect(),
        };
        if remaining.keys.is_empty() {
            return Err(ConfigError::Instruction(format!(
                "{}: must have at least one admin API auth key",
                Self::NAME
            )));
        }
        Ok(current.with_item(SecretItem::from_data(AdminApiAuthKey(remaining))?))
    }
}

impl ApplyInstruction for AdminApiAuthKeyInstruction {
    const NAME: &'static str = "adminAPIAuthKey";

    fn action(&self) -> InstructionAction {
        self.action
    }

    fn apply(&self, context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        match self.action {
            InstructionAction::Generate => Self::generate(context, current),
            InstructionAction::Delete => self.delete(current),
            InstructionAction::Set | InstructionAction::Unset | InstructionAction::Cleanup => {
                Err(self.unexpected_action())
            }
        }
    }
}

// ============================================================================
// SECTION: Bot Protection Provider Secret
// ============================================================================

/// Sets the bot protection provider secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BotProtectionProviderSecretInstruction {
    /// Requested action; only `set` is supported.
    pub action: InstructionAction,
    /// Secret for `set`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BotProtectionProviderSecretUpdate>,
}

/// Provider secret carried by a `set`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BotProtectionProviderSecretUpdate {
    /// Provider kind.
    #[serde(rename = "type")]
    pub provider_type: BotProtectionProviderType,
    /// Secret key issued by the provider.
    pub secret_key: String,
}

impl ApplyInstruction for BotProtectionProviderSecretInstruction {
    const NAME: &'static str = "botProtectionProviderSecret";

    fn action(&self) -> InstructionAction {
        self.action
    }

    fn apply(&self, _context: &UpdateInstructionContext, current: &SecretConfig) -> Result<SecretConfig, ConfigError> {
        if self.action != InstructionAction::Set {
            return Err(self.unexpected_action());
        }
        let data = self.data.as_ref().ok_or_else(|| missing(Self::NAME, "data"))?;
        let item = SecretItem::from_data(BotProtectionProviderCredentials {
            provider_type: data.provider_type,
            secret_key: data.secret_key.clone(),
        })?;
        Ok(current.with_item(item))
    }
}

// crates/tessera-config/src/update/mod.rs
// ============================================================================
// Module: Update Instruction Applier
// Description: Compound secret update instructions and their application.
// Purpose: Patch secrets incrementally without full re-submission.
// Dependencies: serde, serde_json, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! A [`SecretConfigUpdateInstruction`] names up to five instructions. The
//! [`UpdateInstructionApplier`] applies them in a fixed order:
//!
//! 1. `oauthSSOProviderClientSecrets`
//! 2. `smtpSecret`
//! 3. `oauthClientSecrets`
//! 4. `adminAPIAuthKey`
//! 5. `botProtectionProviderSecret`
//!
//! The first failing step aborts the whole application. Intermediate
//! snapshots stay local to the call, and the caller's snapshot is only read.
//! Produced snapshots hold defaulted, typed items; run
//! [`SecretConfig::reparse`] to send them through the document pipeline.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod context;
pub mod instructions;

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

pub use self::context::Clock;
pub use self::context::KeyGenerator;
pub use self::context::RandomKeyGenerator;
pub use self::context::SystemClock;
pub use self::context::UpdateInstructionContext;
pub use self::context::octet_key;
pub use self::instructions::AdminApiAuthKeyDeleteData;
pub use self::instructions::AdminApiAuthKeyInstruction;
pub use self::instructions::ApplyInstruction;
pub use self::instructions::BotProtectionProviderSecretInstruction;
pub use self::instructions::BotProtectionProviderSecretUpdate;
pub use self::instructions::InstructionAction;
pub use self::instructions::MAX_ADMIN_API_KEYS;
pub use self::instructions::OAuthClientSecretsCleanupData;
pub use self::instructions::OAuthClientSecretsGenerateData;
pub use self::instructions::OAuthClientSecretsInstruction;
pub use self::instructions::OAuthSsoProviderCredentialsInstruction;
pub use self::instructions::OAuthSsoProviderCredentialsUpdate;
pub use self::instructions::SmtpCredentialsInstruction;
pub use self::instructions::SmtpCredentialsUpdate;
use crate::error::ConfigError;
use crate::secrets::SecretConfig;

// ============================================================================
// SECTION: Compound Instruction
// ============================================================================

/// Envelope naming the instructions to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecretConfigUpdateInstruction {
    /// Provider client secrets.
    #[serde(
        rename = "oauthSSOProviderClientSecrets",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub oauth_sso_provider_client_secrets: Option<OAuthSsoProviderCredentialsInstruction>,
    /// SMTP credentials.
    #[serde(rename = "smtpSecret", default, skip_serializing_if = "Option::is_none")]
    pub smtp_secret: Option<SmtpCredentialsInstruction>,
    /// Confidential client secrets.
    #[serde(rename = "oauthClientSecrets", default, skip_serializing_if = "Option::is_none")]
    pub oauth_client_secrets: Option<OAuthClientSecretsInstruction>,
    /// Admin API keys.
    #[serde(rename = "adminAPIAuthKey", default, skip_serializing_if = "Option::is_none")]
    pub admin_api_auth_key: Option<AdminApiAuthKeyInstruction>,
    /// Bot protection provider secret.
    #[serde(rename = "botProtectionProviderSecret", default, skip_serializing_if = "Option::is_none")]
    pub bot_protection_provider_secret: Option<BotProtectionProviderSecretInstruction>,
}

impl SecretConfigUpdateInstruction {
    /// Returns true when no instruction is named.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.oauth_sso_provider_client_secrets.is_none()
            && self.smtp_secret.is_none()
            && self.oauth_client_secrets.is_none()
            && self.admin_api_auth_key.is_none()
            && self.bot_protection_provider_secret.is_none()
    }
}

/// Parses an instruction envelope from YAML or JSON text.
///
/// # Errors
///
/// Returns [`ConfigError::Instruction`] when the text is malformed or names
/// an unknown instruction.
pub fn parse_update_instruction(text: &str) -> Result<SecretConfigUpdateInstruction, ConfigError> {
    serde_yaml::from_str(text).map_err(|err| ConfigError::Instruction(err.to_string()))
}

// ============================================================================
// SECTION: Applier
// ============================================================================

/// Applies compound instructions with one set of collaborators.
#[derive(Debug, Default)]
pub struct UpdateInstructionApplier {
    /// Clock and key source.
    context: UpdateInstructionContext,
}

impl UpdateInstructionApplier {
    /// Creates an applier over `context`.
    #[must_use]
    pub const fn new(context: UpdateInstructionContext) -> Self {
        Self {
            context,
        }
    }

    /// Applies every named instruction in the fixed order.
    ///
    /// # Errors
    ///
    /// Returns the first instruction error; no snapshot is produced then.
    pub fn apply(
        &self,
        instruction: &SecretConfigUpdateInstruction,
        current: &SecretConfig,
    ) -> Result<SecretConfig, ConfigError> {
        let mut snapshot = current.clone();
        if let Some(step) = &instruction.oauth_sso_provider_client_secrets {
            snapshot = self.apply_one(step, &snapshot)?;
        }
        if let Some(step) = &instruction.smtp_secret {
            snapshot = self.apply_one(step, &snapshot)?;
        }
        if let Some(step) = &instruction.oauth_client_secrets {
            snapshot = self.apply_one(step, &snapshot)?;
        }
        if let Some(step) = &instruction.admin_api_auth_key {
            snapshot = self.apply_one(step, &snapshot)?;
        }
        if let Some(step) = &instruction.bot_protection_provider_secret {
            snapshot = self.apply_one(step, &snapshot)?;
        }
        Ok(snapshot)
    }

    /// Applies a single instruction.
    ///
    /// # Errors
    ///
    /// Returns the instruction's error.
    pub fn apply_one<I: ApplyInstruction>(
        &self,
        instruction: &I,
        current: &SecretConfig,
    ) -> Result<SecretConfig, ConfigError> {
        tracing::info!(instruction = I::NAME, action = %instruction.action(), "applying secret update instruction");
        instruction.apply(&self.context, current)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;

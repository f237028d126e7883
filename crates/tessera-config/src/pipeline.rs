// crates/tessera-config/src/pipeline.rs
// ============================================================================
// Module: Config Pipeline
// Description: Loads the app config and secrets into one validated snapshot.
// Purpose: Give callers a single immutable value to share across threads.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! [`Config::load`] parses both documents, cross-checks the secrets with
//! [`SecretValidator`], and wraps the results in [`Arc`]s. Swapping to a new
//! snapshot is a single pointer assignment owned by the caller.

use std::sync::Arc;

use crate::app::AppConfig;
use crate::app::parse_app_config;
use crate::error::ConfigError;
use crate::masking::MaskPatterns;
use crate::secrets::SecretConfig;
use crate::secrets::parse_secret_config;
use crate::validator::SecretValidator;

/// Validated application config and secrets.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application configuration.
    pub app: Arc<AppConfig>,
    /// Secrets satisfying the app's requirements.
    pub secrets: Arc<SecretConfig>,
}

impl Config {
    /// Parses and cross-checks both documents.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's [`ConfigError`]. Secret decode errors
    /// are already redacted; cross-check messages name keys and aliases only.
    pub fn load(app_text: &str, secret_text: &str) -> Result<Self, ConfigError> {
        let app = parse_app_config(app_text)?;
        let secrets = parse_secret_config(secret_text)?;
        Self::from_parts(app, secrets)
    }

    /// Cross-checks already parsed snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when a required secret is missing.
    pub fn from_parts(app: AppConfig, secrets: SecretConfig) -> Result<Self, ConfigError> {
        SecretValidator::new(&app).check(&secrets)?;
        tracing::debug!(app_id = %app.id, secrets = secrets.len(), "loaded config snapshot");
        Ok(Self {
            app: Arc::new(app),
            secrets: Arc::new(secrets),
        })
    }

    /// Returns masking patterns for the loaded secrets.
    #[must_use]
    pub fn mask_patterns(&self) -> MaskPatterns {
        self.secrets.mask_patterns()
    }
}

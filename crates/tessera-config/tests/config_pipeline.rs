//! End-to-end load tests covering secret requirements.
// crates/tessera-config/tests/config_pipeline.rs
// =============================================================================
// Module: Config Pipeline Tests
// Description: Load app and secret documents together.
// Purpose: Ensure a snapshot pair is rejected whenever a required secret is missing.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use tessera_config::Config;
use tessera_config::ConfigError;
use tessera_config::SecretKey;
use tessera_config::SecretValidator;
use tessera_config::ViolationPath;
use tessera_config::parse_secret_config;

mod common;

type TestResult = Result<(), String>;

#[test]
fn fixture_pair_loads() -> TestResult {
    let config = Config::load(common::APP_YAML, common::SECRETS_YAML).map_err(|err| err.to_string())?;
    if config.app.id != "demo" || config.secrets.len() != 6 {
        return Err("unexpected snapshot contents".to_string());
    }
    let masked = config.mask_patterns().mask("connect with google-client-secret");
    if masked.contains("google-client-secret") {
        return Err(format!("secret leaked: {masked}"));
    }
    Ok(())
}

#[test]
fn every_requirement_is_enforced_on_load() -> TestResult {
    let cases = [
        ("db", "db"),
        ("redis", "redis"),
        ("admin-api.auth", "admin-api.auth"),
        ("sso.oauth.client", "sso.oauth.client"),
        ("oauth.client_secrets", "oauth.client_secrets"),
        ("webhook", "webhook"),
    ];
    for (removed, path) in cases {
        let secrets = common::secrets_without(removed);
        match Config::load(common::APP_YAML, &secrets) {
            Err(ConfigError::Validation(error)) if error.has_path(path) => {}
            Err(other) => return Err(format!("removing {removed}: unexpected error {other}")),
            Ok(_) => return Err(format!("removing {removed} should fail")),
        }
    }
    Ok(())
}

#[test]
fn missing_alias_reports_one_violation() -> TestResult {
    let app = common::app().map_err(|err| err.to_string())?;
    let secrets = parse_secret_config(&common::secrets_without("sso.oauth.client")).map_err(|err| err.to_string())?;
    let violations = SecretValidator::new(&app).validate(&secrets);
    if violations.len() != 1 {
        return Err(format!("expected one violation, got {}", violations.len()));
    }
    if violations[0].path != ViolationPath::Key(SecretKey::OAuthSsoProvider) {
        return Err(format!("unexpected path {}", violations[0].path));
    }
    if !violations[0].message.contains("'google'") {
        return Err(format!("message should name the alias: {}", violations[0].message));
    }
    Ok(())
}

#[test]
fn secret_load_errors_surface_before_cross_checks() -> TestResult {
    let broken = format!("{}  - key: mail.smtp\n    data: {{ host: mail, port: 0, username: mailer, password: mail-pass }}\n", common::SECRETS_YAML);
    match Config::load(common::APP_YAML, &broken) {
        Err(ConfigError::Validation(error)) if error.has_path("/secrets/6/data/port") => Ok(()),
        Err(other) => Err(format!("unexpected error {other}")),
        Ok(_) => Err("port 0 should be rejected".to_string()),
    }
}

// crates/tessera-config/src/validator/tests.rs
// ============================================================================
// Module: Secret Validator Unit Tests
// Description: Requirement rules driven by application features.
// Purpose: Pin messages and paths reported for missing secrets.
// Dependencies: tessera-config
// ============================================================================

//! ## Overview
//! Builds app and secret snapshots from YAML and checks the exact violations.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions are permitted."
)]

use super::SecretValidator;
use super::SecretViolation;
use super::ViolationPath;
use crate::app::AppConfig;
use crate::app::parse_app_config;
use crate::secrets::SecretConfig;
use crate::secrets::SecretKey;
use crate::secrets::parse_secret_config;

const CORE_SECRETS: &str = r"
secrets:
  - key: db
    data: { database_url: postgres://db }
  - key: redis
    data: { redis_url: redis://cache }
  - key: admin-api.auth
    data:
      keys:
        - { kid: admin-1, kty: oct, k: YWRtaW4 }
";

fn app(text: &str) -> AppConfig {
    parse_app_config(text).unwrap()
}

fn secrets_with(extra: &str) -> SecretConfig {
    parse_secret_config(&format!("{CORE_SECRETS}{extra}")).unwrap()
}

fn paths(violations: &[SecretViolation]) -> Vec<String> {
    violations.iter().map(|violation| violation.path.to_string()).collect()
}

#[test]
fn core_secrets_satisfy_a_minimal_app() {
    let config = app("id: demo");
    let violations = SecretValidator::new(&config).validate(&secrets_with(""));
    assert!(violations.is_empty());
}

#[test]
fn missing_core_secrets_are_reported_by_key() {
    let config = app("id: demo");
    let violations = SecretValidator::new(&config).validate(&SecretConfig::new());
    assert_eq!(paths(&violations), vec!["db", "redis", "admin-api.auth"]);
    assert_eq!(violations[0].message, "database credentials (secret 'db') is required");
}

#[test]
fn adding_a_secret_clears_only_its_own_violation() {
    let config = app("id: demo");
    let validator = SecretValidator::new(&config);
    let before = validator.validate(&SecretConfig::new());
    let with_db = parse_secret_config("secrets:\n  - key: db\n    data: { database_url: postgres://db }\n").unwrap();
    let after = validator.validate(&with_db);

    assert_eq!(paths(&before), vec!["db", "redis", "admin-api.auth"]);
    assert_eq!(paths(&after), vec!["redis", "admin-api.auth"]);
    assert_eq!(&before[1 ..], &after[..]);
}

#[test]
fn missing_provider_secret_is_one_violation_per_alias() {
    let config = app("id: demo\nidentity:\n  oauth:\n    providers:\n      - { alias: google, type: google }\n");
    let violations = SecretValidator::new(&config).validate(&secrets_with(""));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "OAuth client credentials for 'google' is required");
    assert_eq!(violations[0].path, ViolationPath::Key(SecretKey::OAuthSsoProvider));
}

#[test]
fn empty_provider_secret_points_at_the_entry() {
    let config = app(
        "id: demo\nidentity:\n  oauth:\n    providers:\n      - { alias: google, type: google }\n      - { alias: github, type: github, credentials_behavior: use_demo_credentials }\n",
    );
    let secrets = secrets_with(
        "  - key: sso.oauth.client\n    data:\n      items:\n        - { alias: github }\n        - { alias: google, client_secret: '' }\n",
    );
    let violations = SecretValidator::new(&config).validate(&secrets);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path.to_string(), "/secrets/3/data/items/1");
}

#[test]
fn confidential_clients_need_key_sets() {
    let config = app(
        "id: demo\noauth:\n  clients:\n    - { client_id: portal, x_application_type: confidential }\n    - { client_id: web, x_application_type: spa }\n",
    );
    let missing = SecretValidator::new(&config).validate(&secrets_with(""));
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].path, ViolationPath::Key(SecretKey::OAuthClientSecrets));

    let partial = secrets_with(
        "  - key: oauth.client_secrets\n    data:\n      items:\n        - { client_id: other, keys: [] }\n",
    );
    let violations = SecretValidator::new(&config).validate(&partial);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "OAuth client secret for 'portal' is required");
}

#[test]
fn webhook_handlers_need_signing_keys() {
    let config = app("id: demo\nhook:\n  blocking_handlers:\n    - { event: user.pre_create, url: 'https://hooks.example.com/a' }\n");
    let violations = SecretValidator::new(&config).validate(&secrets_with(""));
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].path, ViolationPath::Key(SecretKey::Webhook));
}

#[test]
fn bot_protection_secret_type_must_match() {
    let config = app("id: demo\nbot_protection:\n  enabled: true\n  provider: { type: recaptchav2, site_key: site }\n");
    let secrets = secrets_with(
        "  - key: bot_protection.provider\n    data: { type: cloudflare, secret_key: turnstile-secret }\n",
    );
    let violations = SecretValidator::new(&config).validate(&secrets);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].message, "bot protection provider credentials for 'recaptchav2' is required");

    let disabled = app("id: demo\nbot_protection:\n  enabled: false\n");
    assert!(SecretValidator::new(&disabled).validate(&secrets_with("")).is_empty());
}

#[test]
fn check_aggregates_into_one_error() {
    let config = app("id: demo");
    let err = SecretValidator::new(&config).check(&SecretConfig::new()).unwrap_err();
    assert!(err.has_path("db"));
    assert!(err.has_path("redis"));
    assert_eq!(err.violations().len(), 3);
}

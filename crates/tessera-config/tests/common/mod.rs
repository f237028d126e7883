// crates/tessera-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared fixtures for tessera-config integration tests.
// Purpose: Keep app and secret documents consistent across suites.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use tessera_config::AppConfig;
use tessera_config::ConfigError;
use tessera_config::SecretConfig;
use tessera_config::parse_app_config;
use tessera_config::parse_secret_config;

/// App with one SSO provider, one confidential client, and a webhook.
pub const APP_YAML: &str = r"
id: demo
http:
  public_origin: https://demo.example.com
localization:
  fallback_language: en
  supported_languages: [en, fr]
identity:
  oauth:
    providers:
      - { alias: google, type: google, client_id: google-client }
oauth:
  clients:
    - { client_id: portal, name: Portal, x_application_type: confidential }
    - { client_id: web, x_application_type: spa, access_token_lifetime_seconds: 3600 }
hook:
  non_blocking_handlers:
    - { events: [user.created], url: 'https://hooks.example.com/created' }
";

/// Secrets satisfying every requirement of [`APP_YAML`].
pub const SECRETS_YAML: &str = r"
secrets:
  - key: db
    data:
      database_url: postgres://app:db-password@db/app
  - key: redis
    data:
      redis_url: redis://:cache-password@cache:6379
  - key: admin-api.auth
    data:
      keys:
        - { kid: admin-seed, kty: oct, k: YWRtaW4tc2VlZC1rZXk }
  - key: sso.oauth.client
    data:
      items:
        - { alias: google, client_secret: google-client-secret }
  - key: oauth.client_secrets
    data:
      items:
        - client_id: portal
          keys:
            - { kid: portal-1, kty: oct, k: cG9ydGFsLXNlY3JldA }
  - key: webhook
    data:
      keys:
        - { kid: webhook-1, kty: oct, k: d2ViaG9vay1zZWNyZXQ }
";

/// Parses [`APP_YAML`].
pub fn app() -> Result<AppConfig, ConfigError> {
    parse_app_config(APP_YAML)
}

/// Parses [`SECRETS_YAML`].
pub fn secrets() -> Result<SecretConfig, ConfigError> {
    parse_secret_config(SECRETS_YAML)
}

/// Returns [`SECRETS_YAML`] without the item starting at `key: <key>`.
pub fn secrets_without(key: &str) -> String {
    let marker = format!("  - key: {key}\n");
    let Some(start) = SECRETS_YAML.find(&marker) else {
        return SECRETS_YAML.to_string();
    };
    let rest = &SECRETS_YAML[start + marker.len() ..];
    let end = rest.find("  - key: ").map_or(SECRETS_YAML.len(), |offset| start + marker.len() + offset);
    format!("{}{}", &SECRETS_YAML[.. start], &SECRETS_YAML[end ..])
}

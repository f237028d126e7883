//! Application config parsing, defaulting, and cross-field validation tests.
// crates/tessera-config/tests/app_config.rs
// =============================================================================
// Module: App Config Tests
// Description: Parse documents end to end through schema, decode, and defaults.
// Purpose: Ensure app snapshots are defaulted and invariant-checked.
// =============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use tessera_config::ConfigError;
use tessera_config::apply_defaults;
use tessera_config::app::ApplicationType;
use tessera_config::app::BotProtectionProviderType;
use tessera_config::parse_app_config;

mod common;

type TestResult = Result<(), String>;

fn assert_invalid<T>(result: Result<T, ConfigError>, path: &str, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if !error.has_path(path) {
                return Err(format!("error {message} did not report {path}"));
            }
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn fixture_app_parses_with_defaults() -> TestResult {
    let config = common::app().map_err(|err| err.to_string())?;
    let portal = &config.oauth_clients()[0];
    if portal.x_application_type != Some(ApplicationType::Confidential) {
        return Err("portal should be confidential".to_string());
    }
    if portal.access_token_lifetime_seconds != Some(1800) {
        return Err("access token lifetime should default to 1800".to_string());
    }
    if portal.refresh_token_lifetime_seconds != Some(86_400) {
        return Err("refresh token lifetime should default to 86400".to_string());
    }
    let hook = config.hook.as_ref().ok_or("hook section missing")?;
    if hook.sync_hook_timeout_seconds != Some(5) || hook.sync_hook_total_timeout_seconds != Some(10) {
        return Err("hook timeouts should default to 5 and 10".to_string());
    }
    Ok(())
}

#[test]
fn refresh_lifetime_defaults_to_at_least_access_lifetime() -> TestResult {
    let config = parse_app_config(
        "id: demo\noauth:\n  clients:\n    - { client_id: long, access_token_lifetime_seconds: 172800 }\n",
    )
    .map_err(|err| err.to_string())?;
    if config.oauth_clients()[0].refresh_token_lifetime_seconds != Some(172_800) {
        return Err("refresh lifetime should follow a longer access lifetime".to_string());
    }
    Ok(())
}

#[test]
fn missing_id_is_a_schema_error() -> TestResult {
    let result = parse_app_config("http: {}\n");
    if !matches!(result, Err(ConfigError::Schema(_))) {
        return Err("expected a schema error".to_string());
    }
    assert_invalid(result, "", "id")
}

#[test]
fn unknown_fields_are_rejected_at_their_path() -> TestResult {
    assert_invalid(parse_app_config("id: demo\nhttp:\n  public_origins: []\n"), "/http", "public_origins")
}

#[test]
fn malformed_yaml_is_a_parse_error() -> TestResult {
    match parse_app_config("id: [unterminated") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("expected parse error, got {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn shorter_refresh_lifetime_is_rejected() -> TestResult {
    assert_invalid(
        parse_app_config(
            "id: demo\noauth:\n  clients:\n    - { client_id: c, access_token_lifetime_seconds: 3600, refresh_token_lifetime_seconds: 600 }\n",
        ),
        "/oauth/clients/0/refresh_token_lifetime_seconds",
        "refresh token lifetime",
    )
}

#[test]
fn duplicated_provider_alias_is_rejected() -> TestResult {
    assert_invalid(
        parse_app_config(
            "id: demo\nidentity:\n  oauth:\n    providers:\n      - { alias: corp, type: google }\n      - { alias: corp, type: github }\n",
        ),
        "/identity/oauth/providers/1/alias",
        "duplicated OAuth provider alias 'corp'",
    )
}

#[test]
fn fallback_language_must_be_supported() -> TestResult {
    assert_invalid(
        parse_app_config("id: demo\nlocalization:\n  fallback_language: ja\n  supported_languages: [en]\n"),
        "/localization/supported_languages",
        "fallback language 'ja'",
    )
}

#[test]
fn supported_languages_default_to_the_fallback() -> TestResult {
    let config =
        parse_app_config("id: demo\nlocalization:\n  fallback_language: de\n").map_err(|err| err.to_string())?;
    let localization = config.localization.ok_or("localization missing")?;
    if localization.supported_languages != vec!["de".to_string()] {
        return Err("supported languages should default to [de]".to_string());
    }
    Ok(())
}

#[test]
fn login_id_flags_follow_modify_disabled() -> TestResult {
    let config = parse_app_config(
        "id: demo\nidentity:\n  login_id:\n    keys:\n      - { type: email, modify_disabled: true, delete_disabled: false }\n",
    )
    .map_err(|err| err.to_string())?;
    let identity = config.identity.ok_or("identity missing")?;
    let key = &identity.login_id.ok_or("login_id missing")?.keys[0];
    if key.key() != "email" || key.max_length != Some(320) {
        return Err("email key should default its name and max length".to_string());
    }
    if !key.create_disabled() || !key.update_disabled() || key.delete_disabled() {
        return Err("unset flags should follow modify_disabled; explicit flags win".to_string());
    }
    Ok(())
}

#[test]
fn bot_protection_stays_absent_unless_declared() -> TestResult {
    let bare = parse_app_config("id: demo\n").map_err(|err| err.to_string())?;
    if bare.bot_protection.is_some() {
        return Err("bot_protection should stay absent".to_string());
    }
    let enabled = parse_app_config(
        "id: demo\nbot_protection:\n  enabled: true\n  provider: { type: cloudflare, site_key: site }\n",
    )
    .map_err(|err| err.to_string())?;
    let provider = enabled.enabled_bot_protection_provider().ok_or("provider missing")?;
    if provider.provider_type != BotProtectionProviderType::Cloudflare {
        return Err("provider type should be cloudflare".to_string());
    }
    Ok(())
}

#[test]
fn defaulting_a_parsed_snapshot_again_changes_nothing() -> TestResult {
    let config = common::app().map_err(|err| err.to_string())?;
    let mut again = config.clone();
    apply_defaults(&mut again);
    if again != config {
        return Err("defaults should be idempotent".to_string());
    }
    Ok(())
}

#[test]
fn serialized_snapshot_parses_back_equal() -> TestResult {
    let config = common::app().map_err(|err| err.to_string())?;
    let text = serde_yaml::to_string(&config).map_err(|err| err.to_string())?;
    let reparsed = parse_app_config(&text).map_err(|err| err.to_string())?;
    if reparsed != config {
        return Err(format!("reloaded snapshot differs from the original:\n{text}"));
    }
    Ok(())
}

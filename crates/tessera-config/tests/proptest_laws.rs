//! Property tests for defaulting, overlay, snapshot round-trips, and diffs.
//!
//! ## What is covered
//! - Defaulting a tree twice equals defaulting it once.
//! - Overlays are deterministic and the last layer wins per key.
//! - Serialized app and secret snapshots parse back to equal snapshots.
//! - A snapshot never differs from itself.
// crates/tessera-config/tests/proptest_laws.rs
// ============================================================================
// Module: Config Property-Based Tests
// Description: Algebraic laws of the config pipeline.
// Purpose: Catch ordering and idempotence regressions on generated inputs.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use tessera_config::AppConfig;
use tessera_config::ConfigDiffer;
use tessera_config::SecretConfig;
use tessera_config::SecretItem;
use tessera_config::SecretKey;
use tessera_config::apply_defaults;
use tessera_config::app::DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS;
use tessera_config::app::DEFAULT_FALLBACK_LANGUAGE;
use tessera_config::app::LocalizationConfig;
use tessera_config::app::OAuthClientConfig;
use tessera_config::app::OAuthConfig;
use tessera_config::parse_app_config;
use tessera_config::parse_secret_config;
use tessera_config::secrets::DatabaseCredentials;
use tessera_config::secrets::RedisCredentials;
use tessera_config::secrets::SmtpServerCredentials;

fn client_strategy() -> impl Strategy<Value = OAuthClientConfig> {
    ("[a-z]{1,12}", proptest::option::of(300u64 .. 200_000), proptest::option::of(300u64 .. 200_000)).prop_map(
        |(client_id, access, refresh)| OAuthClientConfig {
            client_id,
            access_token_lifetime_seconds: access,
            refresh_token_lifetime_seconds: refresh,
            ..OAuthClientConfig::default()
        },
    )
}

fn app_strategy() -> impl Strategy<Value = AppConfig> {
    (
        proptest::collection::vec(client_strategy(), 0 .. 4),
        proptest::option::of(proptest::collection::vec("[a-z]{2}", 0 .. 3)),
    )
        .prop_map(|(clients, languages)| AppConfig {
            id: "generated".to_string(),
            oauth: Some(OAuthConfig {
                clients,
            }),
            localization: languages.map(|supported_languages| LocalizationConfig {
                fallback_language: None,
                supported_languages,
            }),
            ..AppConfig::default()
        })
}

/// Apps that pass the cross-field rules: unique client ids, refresh lifetimes
/// not below access lifetimes, and the fallback language among the supported.
fn valid_app_strategy() -> impl Strategy<Value = AppConfig> {
    app_strategy().prop_map(|mut app| {
        if let Some(oauth) = app.oauth.as_mut() {
            for (index, client) in oauth.clients.iter_mut().enumerate() {
                client.client_id = format!("{}-{index}", client.client_id);
                let access = client.access_token_lifetime_seconds.unwrap_or(DEFAULT_ACCESS_TOKEN_LIFETIME_SECONDS);
                client.refresh_token_lifetime_seconds = client.refresh_token_lifetime_seconds.map(|refresh| refresh.max(access));
            }
        }
        if let Some(localization) = app.localization.as_mut() {
            let languages = &mut localization.supported_languages;
            languages.sort();
            languages.dedup();
            if !languages.is_empty() && !languages.iter().any(|language| language == DEFAULT_FALLBACK_LANGUAGE) {
                languages.push(DEFAULT_FALLBACK_LANGUAGE.to_string());
            }
        }
        app
    })
}

fn secrets_strategy() -> impl Strategy<Value = SecretConfig> {
    (
        proptest::option::of("[a-z]{1,10}"),
        proptest::option::of("[a-z]{1,10}"),
        proptest::option::of((1i64 .. 65_536, "[a-z]{1,8}")),
    )
        .prop_map(|(database, redis, smtp)| {
            let mut items = Vec::new();
            if let Some(name) = database {
                items.push(
                    SecretItem::from_data(DatabaseCredentials {
                        database_url: format!("postgres://{name}"),
                        database_schema: None,
                    })
                    .unwrap(),
                );
            }
            if let Some(host) = redis {
                items.push(
                    SecretItem::from_data(RedisCredentials {
                        redis_url: format!("redis://{host}"),
                    })
                    .unwrap(),
                );
            }
            if let Some((port, user)) = smtp {
                items.push(
                    SecretItem::from_data(SmtpServerCredentials {
                        host: "mail".to_string(),
                        port,
                        mode: None,
                        username: user.clone(),
                        password: format!("{user}-password"),
                    })
                    .unwrap(),
                );
            }
            SecretConfig::from_items(items).unwrap()
        })
}

proptest! {
    #[test]
    fn defaulting_is_idempotent(app in app_strategy()) {
        let mut once = app;
        apply_defaults(&mut once);
        let mut twice = once.clone();
        apply_defaults(&mut twice);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn overlay_is_deterministic_and_last_layer_wins(
        base in secrets_strategy(),
        first in secrets_strategy(),
        second in secrets_strategy(),
    ) {
        let merged = SecretConfig::overlay(&base, &[&first, &second]);
        prop_assert_eq!(&merged, &SecretConfig::overlay(&base, &[&first, &second]));

        let mut keys: Vec<SecretKey> = Vec::new();
        for item in base.items().iter().chain(first.items()).chain(second.items()) {
            if !keys.contains(&item.key()) {
                keys.push(item.key());
            }
        }
        prop_assert_eq!(merged.items().len(), keys.len());
        for key in keys {
            let expected = [&second, &first, &base]
                .into_iter()
                .find_map(|layer| layer.find(key))
                .map(|(_, item)| item.clone());
            prop_assert_eq!(merged.find(key).map(|(_, item)| item.clone()), expected);
        }
    }

    #[test]
    fn serialized_snapshots_parse_back_equal(secrets in secrets_strategy()) {
        let text = serde_yaml::to_string(&secrets).unwrap();
        let reparsed = parse_secret_config(&text).unwrap();
        prop_assert_eq!(reparsed, secrets);
    }

    #[test]
    fn serialized_apps_parse_back_equal(app in valid_app_strategy()) {
        let mut defaulted = app.clone();
        apply_defaults(&mut defaulted);
        let parsed = parse_app_config(&serde_yaml::to_string(&app).unwrap()).unwrap();
        prop_assert_eq!(&parsed, &defaulted);
        let reparsed = parse_app_config(&serde_yaml::to_string(&parsed).unwrap()).unwrap();
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn a_snapshot_never_differs_from_itself(secrets in secrets_strategy(), app in app_strategy()) {
        let secret_diff = ConfigDiffer::diff(&secrets, &secrets).unwrap();
        prop_assert!(!secret_diff.has_changes);
        prop_assert!(secret_diff.text.is_empty());
        prop_assert_eq!(&secret_diff.original_digest, &secret_diff.updated_digest);
        let app_diff = ConfigDiffer::diff(&app, &app).unwrap();
        prop_assert!(app_diff.entries.is_empty());
    }
}

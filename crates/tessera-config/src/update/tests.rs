// crates/tessera-config/src/update/tests.rs
// ============================================================================
// Module: Update Instruction Unit Tests
// Description: Per-instruction semantics and compound ordering.
// Purpose: Pin replace/remove behavior with deterministic collaborators.
// Dependencies: tessera-config, time
// ============================================================================

//! ## Overview
//! Uses a fixed clock and a counting key generator so minted keys are known.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions are permitted."
)]

use std::sync::atomic::AtomicU8;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;
use time::macros::datetime;

use super::Clock;
use super::InstructionAction;
use super::KeyGenerator;
use super::SecretConfigUpdateInstruction;
use super::UpdateInstructionApplier;
use super::UpdateInstructionContext;
use super::octet_key;
use super::parse_update_instruction;
use crate::error::ConfigError;
use crate::secrets::AdminApiAuthKey;
use crate::secrets::BotProtectionProviderCredentials;
use crate::secrets::Jwk;
use crate::secrets::OAuthClientCredentials;
use crate::secrets::OAuthSsoProviderCredentials;
use crate::secrets::SecretConfig;
use crate::secrets::SecretKey;
use crate::secrets::SmtpMode;
use crate::secrets::SmtpServerCredentials;
use crate::secrets::parse_secret_config;

struct FixedClock;

impl Clock for FixedClock {
    fn now_utc(&self) -> OffsetDateTime {
        datetime!(2026-01-02 03:04:05 UTC)
    }
}

#[derive(Default)]
struct CountingKeys {
    next: AtomicU8,
}

impl CountingKeys {
    fn mint(&self, prefix: &str, now: OffsetDateTime) -> Jwk {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        octet_key([seq; 32], &format!("{prefix}-{seq}"), now, None)
    }
}

impl KeyGenerator for CountingKeys {
    fn generate_client_secret_key(&self, now: OffsetDateTime) -> Jwk {
        self.mint("client", now)
    }

    fn generate_admin_api_key(&self, now: OffsetDateTime) -> Jwk {
        self.mint("admin", now)
    }
}

fn applier() -> UpdateInstructionApplier {
    UpdateInstructionApplier::new(UpdateInstructionContext::new(Box::new(FixedClock), Box::new(CountingKeys::default())))
}

fn instruction(text: &str) -> SecretConfigUpdateInstruction {
    parse_update_instruction(text).unwrap()
}

const CURRENT: &str = r"
secrets:
  - key: db
    data: { database_url: postgres://db }
  - key: sso.oauth.client
    data:
      items:
        - { alias: google, client_secret: google-secret }
        - { alias: github, client_secret: github-secret }
  - key: redis
    data: { redis_url: redis://cache }
  - key: admin-api.auth
    data:
      keys:
        - { kid: admin-seed, kty: oct, k: YWRtaW4 }
";

fn current() -> SecretConfig {
    parse_secret_config(CURRENT).unwrap()
}

fn keys_of(config: &SecretConfig) -> Vec<SecretKey> {
    config.items().iter().map(|item| item.key()).collect()
}

#[test]
fn empty_provider_data_removes_the_item_only() {
    let before = current();
    let after = applier()
        .apply(&instruction("oauthSSOProviderClientSecrets: { action: set, data: [] }"), &before)
        .unwrap();
    assert_eq!(keys_of(&after), vec![SecretKey::Database, SecretKey::Redis, SecretKey::AdminApiAuth]);
    assert_eq!(after.items()[0], before.items()[0]);
    assert_eq!(after.items()[1], before.items()[2]);
    assert_eq!(after.items()[2], before.items()[3]);
    assert_eq!(before.len(), 4);
}

#[test]
fn provider_update_renames_and_keeps_or_replaces_secrets() {
    let text = r"
oauthSSOProviderClientSecrets:
  action: set
  data:
    - { originalAlias: google, newAlias: google-workspace }
    - { originalAlias: github, newAlias: github, newClientSecret: rotated }
    - { newAlias: apple, newClientSecret: apple-secret }
";
    let after = applier().apply(&instruction(text), &current()).unwrap();
    let (index, _) = after.find(SecretKey::OAuthSsoProvider).unwrap();
    assert_eq!(index, 1);
    let credentials = after.lookup_data::<OAuthSsoProviderCredentials>().unwrap();
    let pairs: Vec<(&str, &str)> =
        credentials.items.iter().map(|item| (item.alias.as_str(), item.client_secret.as_str())).collect();
    assert_eq!(
        pairs,
        vec![("google-workspace", "google-secret"), ("github", "rotated"), ("apple", "apple-secret")]
    );
}

#[test]
fn provider_errors_leave_no_snapshot() {
    let unknown = "oauthSSOProviderClientSecrets: { action: set, data: [{ originalAlias: nope, newAlias: nope }] }";
    assert!(matches!(applier().apply(&instruction(unknown), &current()), Err(ConfigError::Instruction(_))));
    let no_secret = "oauthSSOProviderClientSecrets: { action: set, data: [{ newAlias: apple }] }";
    assert!(applier().apply(&instruction(no_secret), &current()).is_err());
    let wrong_action = "oauthSSOProviderClientSecrets: { action: unset, data: [] }";
    let err = applier().apply(&instruction(wrong_action), &current()).unwrap_err();
    assert!(err.to_string().contains("unexpected action for oauthSSOProviderClientSecrets: unset"));
}

#[test]
fn smtp_set_appends_then_replaces_in_place() {
    let set = instruction("smtpSecret: { action: set, data: { host: smtp.example.com, port: 587, username: mailer, password: pw1 } }");
    let first = applier().apply(&set, &current()).unwrap();
    assert_eq!(first.find(SecretKey::Smtp).unwrap().0, 4);
    let smtp = first.lookup_data::<SmtpServerCredentials>().unwrap();
    assert_eq!(smtp.mode, Some(SmtpMode::Normal));

    let again = instruction("smtpSecret: { action: set, data: { host: smtp.example.com, port: 465, username: mailer, password: pw2 } }");
    let second = applier().apply(&again, &first).unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second.lookup_data::<SmtpServerCredentials>().unwrap().port, 465);
}

#[test]
fn smtp_unset_is_idempotent() {
    let set = instruction("smtpSecret: { action: set, data: { host: smtp.example.com, port: 25, username: u1, password: p1 } }");
    let with_smtp = applier().apply(&set, &current()).unwrap();
    let unset = instruction("smtpSecret: { action: unset }");
    let once = applier().apply(&unset, &with_smtp).unwrap();
    let twice = applier().apply(&unset, &once).unwrap();
    assert_eq!(once, twice);
    assert_eq!(once, current());
}

#[test]
fn client_secrets_generate_and_cleanup() {
    let applier = applier();
    let generate = |client: &str| instruction(&format!("oauthClientSecrets: {{ action: generate, generateData: {{ clientID: {client} }} }}"));
    let one = applier.apply(&generate("portal"), &current()).unwrap();
    let two = applier.apply(&generate("backoffice"), &one).unwrap();
    let credentials = two.lookup_data::<OAuthClientCredentials>().unwrap();
    assert_eq!(credentials.items.len(), 2);
    assert_eq!(credentials.items[0].keys[0].kid, "client-0");
    assert_eq!(credentials.items[0].keys[0].params["created_at"], serde_json::json!(1_767_323_045));

    assert!(applier.apply(&generate("portal"), &two).is_err());

    let keep = instruction("oauthClientSecrets: { action: cleanup, cleanupData: { keepClientIDs: [backoffice] } }");
    let kept = applier.apply(&keep, &two).unwrap();
    assert_eq!(kept.lookup_data::<OAuthClientCredentials>().unwrap().items.len(), 1);

    let drop_all = instruction("oauthClientSecrets: { action: cleanup, cleanupData: { keepClientIDs: [] } }");
    let dropped = applier.apply(&drop_all, &two).unwrap();
    assert!(dropped.lookup(SecretKey::OAuthClientSecrets).is_none());
}

#[test]
fn admin_keys_rotate_within_limits() {
    let applier = applier();
    let generate = instruction("adminAPIAuthKey: { action: generate }");
    let two = applier.apply(&generate, &current()).unwrap();
    assert_eq!(two.lookup_data::<AdminApiAuthKey>().unwrap().0.keys.len(), 2);
    let err = applier.apply(&generate, &two).unwrap_err();
    assert!(err.to_string().contains("at most 2"));

    let delete = instruction("adminAPIAuthKey: { action: delete, deleteData: { keyID: admin-seed } }");
    let one = applier.apply(&delete, &two).unwrap();
    let keys = &one.lookup_data::<AdminApiAuthKey>().unwrap().0.keys;
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].kid, "admin-0");
}

#[test]
fn admin_key_delete_keeps_at_least_one() {
    let delete = instruction("adminAPIAuthKey: { action: delete, deleteData: { keyID: admin-seed } }");
    let err = applier().apply(&delete, &current()).unwrap_err();
    assert!(err.to_string().contains("at least one"));
}

#[test]
fn bot_protection_secret_is_set() {
    let set = instruction("botProtectionProviderSecret: { action: set, data: { type: cloudflare, secretKey: turnstile } }");
    let after = applier().apply(&set, &current()).unwrap();
    let credentials = after.lookup_data::<BotProtectionProviderCredentials>().unwrap();
    assert_eq!(credentials.secret_key, "turnstile");
}

#[test]
fn compound_instruction_applies_in_declared_order_and_short_circuits() {
    let text = r"
botProtectionProviderSecret: { action: set, data: { type: cloudflare, secretKey: turnstile } }
smtpSecret: { action: set, data: { host: smtp.example.com, port: 25, username: u1, password: p1 } }
";
    let after = applier().apply(&instruction(text), &current()).unwrap();
    let order: Vec<SecretKey> = keys_of(&after).into_iter().skip(4).collect();
    assert_eq!(order, vec![SecretKey::Smtp, SecretKey::BotProtectionProvider]);

    let failing = r"
smtpSecret: { action: set, data: { host: smtp.example.com, port: 25, username: u1, password: p1 } }
adminAPIAuthKey: { action: set }
";
    assert!(applier().apply(&instruction(failing), &current()).is_err());
}

#[test]
fn applied_snapshots_pass_the_document_pipeline() {
    let text = "smtpSecret: { action: set, data: { host: smtp.example.com, port: 25, username: u1, password: p1 } }\nadminAPIAuthKey: { action: generate }";
    let after = applier().apply(&instruction(text), &current()).unwrap();
    assert_eq!(after.reparse().unwrap(), after);
}

#[test]
fn unknown_instructions_are_rejected() {
    let err = parse_update_instruction("vaultToken: { action: set }").unwrap_err();
    assert!(matches!(err, ConfigError::Instruction(_)));
    assert_eq!(InstructionAction::Cleanup.to_string(), "cleanup");
    assert!(instruction("{}").is_empty());
}

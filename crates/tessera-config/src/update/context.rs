// crates/tessera-config/src/update/context.rs
// ============================================================================
// Module: Update Instruction Context
// Description: Clock and key generation collaborators for instructions.
// Purpose: Keep instruction application deterministic under test.
// Dependencies: base64, rand, serde_json, time
// ============================================================================

//! ## Overview
//! Instructions that mint keys read the current time from a [`Clock`] and
//! obtain key material from a [`KeyGenerator`]. Production code uses
//! [`SystemClock`] and [`RandomKeyGenerator`]; tests inject fixed ones.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use rand::rngs::OsRng;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use crate::secrets::Jwk;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bytes of symmetric key material per generated key.
pub const OCTET_KEY_BYTES: usize = 32;

/// Bytes of randomness behind a generated key identifier.
const KEY_ID_BYTES: usize = 16;

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Source of newly minted keys.
pub trait KeyGenerator: Send + Sync {
    /// Mints a secret key for a confidential OAuth client.
    fn generate_client_secret_key(&self, now: OffsetDateTime) -> Jwk;

    /// Mints an admin API signing key.
    fn generate_admin_api_key(&self, now: OffsetDateTime) -> Jwk;
}

/// Octet keys backed by the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate_client_secret_key(&self, now: OffsetDateTime) -> Jwk {
        octet_key(random_bytes::<OCTET_KEY_BYTES>(), &random_key_id(), now, None)
    }

    fn generate_admin_api_key(&self, now: OffsetDateTime) -> Jwk {
        octet_key(random_bytes::<OCTET_KEY_BYTES>(), &random_key_id(), now, Some("sig"))
    }
}

/// Builds an octet JWK from raw key material.
#[must_use]
pub fn octet_key(material: [u8; OCTET_KEY_BYTES], kid: &str, now: OffsetDateTime, key_use: Option<&str>) -> Jwk {
    let mut params = BTreeMap::new();
    params.insert("k".to_string(), Value::String(URL_SAFE_NO_PAD.encode(material)));
    params.insert("alg".to_string(), json!("HS256"));
    params.insert("created_at".to_string(), json!(now.unix_timestamp()));
    if let Some(key_use) = key_use {
        params.insert("use".to_string(), json!(key_use));
    }
    Jwk {
        kid: kid.to_string(),
        kty: "oct".to_string(),
        params,
    }
}

/// Returns `N` bytes from the OS RNG.
fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Returns a fresh URL-safe key identifier.
fn random_key_id() -> String {
    URL_SAFE_NO_PAD.encode(random_bytes::<KEY_ID_BYTES>())
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Collaborators available while applying instructions.
pub struct UpdateInstructionContext {
    /// Time source.
    clock: Box<dyn Clock>,
    /// Key source.
    keys: Box<dyn KeyGenerator>,
}

impl UpdateInstructionContext {
    /// Creates a context from explicit collaborators.
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, keys: Box<dyn KeyGenerator>) -> Self {
        Self {
            clock,
            keys,
        }
    }

    /// Creates a context using wall-clock time and OS randomness.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Box::new(SystemClock), Box::new(RandomKeyGenerator))
    }

    /// Returns the current time.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now_utc()
    }

    /// Returns the key generator.
    #[must_use]
    pub fn keys(&self) -> &dyn KeyGenerator {
        self.keys.as_ref()
    }
}

impl Default for UpdateInstructionContext {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for UpdateInstructionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateInstructionContext").finish_non_exhaustive()
    }
}

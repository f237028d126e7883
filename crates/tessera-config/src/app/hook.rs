// crates/tessera-config/src/app/hook.rs
// ============================================================================
// Module: Hook Config
// Description: Blocking and non-blocking event handler endpoints.
// Purpose: Declare webhook endpoints and their timeouts.
// Dependencies: serde, serde_json, tessera-schema
// ============================================================================

//! ## Overview
//! Any configured handler makes the webhook signing key a required secret.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tessera_schema::SchemaBuilder;
use tessera_schema::SchemaError;
use tessera_schema::fragment_ref;

use crate::defaults::NullableFields;
use crate::defaults::SetDefaults;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default per-hook timeout in seconds.
pub const DEFAULT_SYNC_HOOK_TIMEOUT_SECONDS: u64 = 5;
/// Default total timeout across blocking hooks in seconds.
pub const DEFAULT_SYNC_HOOK_TOTAL_TIMEOUT_SECONDS: u64 = 10;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Webhook settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookConfig {
    /// Timeout of one blocking hook call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_hook_timeout_seconds: Option<u64>,
    /// Timeout across all blocking hooks of one event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_hook_total_timeout_seconds: Option<u64>,
    /// Handlers whose response can veto an event.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocking_handlers: Vec<BlockingHandlerConfig>,
    /// Fire-and-forget handlers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_blocking_handlers: Vec<NonBlockingHandlerConfig>,
}

impl HookConfig {
    /// Returns true when at least one handler is configured.
    #[must_use]
    pub fn has_handlers(&self) -> bool {
        !self.blocking_handlers.is_empty() || !self.non_blocking_handlers.is_empty()
    }
}

impl SetDefaults for HookConfig {
    fn set_defaults(&mut self) {
        if self.sync_hook_timeout_seconds.is_none() {
            self.sync_hook_timeout_seconds = Some(DEFAULT_SYNC_HOOK_TIMEOUT_SECONDS);
        }
        if self.sync_hook_total_timeout_seconds.is_none() {
            self.sync_hook_total_timeout_seconds = Some(DEFAULT_SYNC_HOOK_TOTAL_TIMEOUT_SECONDS);
        }
    }
}

impl NullableFields for HookConfig {}
crate::populate_defaults!(HookConfig { blocking_handlers, non_blocking_handlers });

/// Handler invoked synchronously for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingHandlerConfig {
    /// Event name.
    pub event: String,
    /// Endpoint URL.
    pub url: String,
}

impl SetDefaults for BlockingHandlerConfig {}
impl NullableFields for BlockingHandlerConfig {}
crate::populate_defaults!(BlockingHandlerConfig {});

/// Handler notified asynchronously for a set of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonBlockingHandlerConfig {
    /// Event names; `*` subscribes to every event.
    pub events: Vec<String>,
    /// Endpoint URL.
    pub url: String,
}

impl SetDefaults for NonBlockingHandlerConfig {}
impl NullableFields for NonBlockingHandlerConfig {}
crate::populate_defaults!(NonBlockingHandlerConfig {});

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Registers the hook fragments.
pub(crate) fn register_schema(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder.add(
        "HookConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "sync_hook_timeout_seconds": { "type": "integer", "minimum": 1, "maximum": 60 },
                "sync_hook_total_timeout_seconds": { "type": "integer", "minimum": 1, "maximum": 60 },
                "blocking_handlers": { "type": "array", "items": fragment_ref("BlockingHandlersConfig") },
                "non_blocking_handlers": { "type": "array", "items": fragment_ref("NonBlockingHandlersConfig") }
            }
        }),
    )?;
    builder.add(
        "BlockingHandlersConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "event": { "type": "string", "minLength": 1 },
                "url": { "type": "string", "format": "hook-uri" }
            },
            "required": ["event", "url"]
        }),
    )?;
    builder.add(
        "NonBlockingHandlersConfig",
        json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "events": { "type": "array", "minItems": 1, "items": { "type": "string", "minLength": 1 } },
                "url": { "type": "string", "format": "hook-uri" }
            },
            "required": ["events", "url"]
        }),
    )
}

// crates/tessera-schema/src/formats.rs
// ============================================================================
// Module: Format Checkers
// Description: Pluggable string-format checkers keyed by format name.
// Purpose: Extend JSON Schema `format` validation with project formats.
// Dependencies: url
// ============================================================================

//! ## Overview
//! A [`FormatRegistry`] maps format names to plain checker functions. The
//! registry is handed to a schema builder; every checker is installed when the
//! assembled document is compiled, so a `"format": "phone"` keyword anywhere
//! in a fragment is enforced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use url::Url;

// ============================================================================
// SECTION: Format Names
// ============================================================================

/// E.164 phone number (`+` followed by up to fifteen digits).
pub const FORMAT_PHONE: &str = "phone";
/// Browser origin: scheme, host, optional port, nothing else.
pub const FORMAT_HTTP_ORIGIN: &str = "http-origin";
/// Absolute HTTP(S) URL used as a hook endpoint.
pub const FORMAT_HOOK_URI: &str = "hook-uri";
/// BCP 47 language tag.
pub const FORMAT_BCP47: &str = "bcp47";
/// Duration string such as `1h30m` or `250ms`.
pub const FORMAT_DURATION_STRING: &str = "x-duration-string";

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Checker returning true when a string satisfies a format.
pub type FormatChecker = fn(&str) -> bool;

/// Named format checkers installed into compiled validators.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    /// Checkers keyed by format name.
    checkers: BTreeMap<String, FormatChecker>,
}

impl FormatRegistry {
    /// Creates a registry without any checker.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            checkers: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the built-in project formats.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.insert(FORMAT_PHONE, is_phone);
        registry.insert(FORMAT_HTTP_ORIGIN, is_http_origin);
        registry.insert(FORMAT_HOOK_URI, is_hook_uri);
        registry.insert(FORMAT_BCP47, is_bcp47);
        registry.insert(FORMAT_DURATION_STRING, is_duration_string);
        registry
    }

    /// Registers or replaces the checker for `name`.
    pub fn insert(&mut self, name: impl Into<String>, checker: FormatChecker) {
        self.checkers.insert(name.into(), checker);
    }

    /// Returns the checker registered for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<FormatChecker> {
        self.checkers.get(name).copied()
    }

    /// Iterates checkers in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FormatChecker)> {
        self.checkers.iter().map(|(name, checker)| (name.as_str(), *checker))
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns true when no checker is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

// ============================================================================
// SECTION: Checkers
// ============================================================================

/// Returns true for E.164 numbers like `+85298765432`.
#[must_use]
pub fn is_phone(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('+') else {
        return false;
    };
    !digits.is_empty()
        && digits.len() <= 15
        && digits.bytes().all(|byte| byte.is_ascii_digit())
        && !digits.starts_with('0')
}

/// Returns true for `scheme://host[:port]` origins without path or query.
#[must_use]
pub fn is_http_origin(value: &str) -> bool {
    if value.ends_with('/') {
        return false;
    }
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|host| !host.is_empty())
        && url.username().is_empty()
        && url.password().is_none()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none()
}

/// Returns true for absolute `http`/`https` URLs with a host.
#[must_use]
pub fn is_hook_uri(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|host| !host.is_empty())
}

/// Returns true for language tags such as `en`, `zh-HK`, `zh-Hant-TW`.
#[must_use]
pub fn is_bcp47(value: &str) -> bool {
    let mut parts = value.split('-');
    let Some(language) = parts.next() else {
        return false;
    };
    let language_ok = (2 ..= 8).contains(&language.len())
        && language.bytes().all(|byte| byte.is_ascii_alphabetic());
    language_ok
        && parts.all(|part| {
            (1 ..= 8).contains(&part.len()) && part.bytes().all(|byte| byte.is_ascii_alphanumeric())
        })
}

/// Returns true for duration strings made of `<number><unit>` pairs.
///
/// Accepted units are `ns`, `us`, `ms`, `s`, `m`, and `h`; numbers may carry
/// a fractional part (`1.5h`).
#[must_use]
pub fn is_duration_string(value: &str) -> bool {
    let mut rest = value;
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        let number_len = rest.bytes().take_while(|byte| byte.is_ascii_digit() || *byte == b'.').count();
        let number = &rest[.. number_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return false;
        }
        rest = &rest[number_len ..];
        let unit_len = rest.bytes().take_while(u8::is_ascii_alphabetic).count();
        if !matches!(&rest[.. unit_len], "ns" | "us" | "ms" | "s" | "m" | "h") {
            return false;
        }
        rest = &rest[unit_len ..];
    }
    true
}

// ============================================================================
// SECTION: Tests
// ============================================================================

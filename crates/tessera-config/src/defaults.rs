// crates/tessera-config/src/defaults.rs
// ============================================================================
// Module: Defaulting Engine
// Description: Bottom-up, idempotent default population for decoded trees.
// Purpose: Fill unset fields with type-declared defaults without reflection.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Every record type in a configuration tree implements [`PopulateDefaults`],
//! usually through [`populate_defaults!`]. The generated walk visits the
//! record's nested records and containers first, then calls the record's own
//! [`SetDefaults::set_defaults`], so a parent routine always observes
//! already-defaulted children.
//!
//! Containers carry the traversal themselves:
//! - `Vec<T>` defaults each element in order;
//! - `BTreeMap<K, V>` defaults each value in key order;
//! - `Option<T>` allocates `T::default()` when absent, then defaults it.
//!
//! A record that implements [`NullableFields`] names child fields whose
//! absence is meaningful; the walk leaves those fields exactly as decoded.
//!
//! Idempotence: every `set_defaults` writes only fields that are still at
//! their absent or zero value, so applying the engine twice is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Capabilities
// ============================================================================

/// A node's own default-population routine.
pub trait SetDefaults {
    /// Fills this node's unset fields. Must only write absent/zero values.
    fn set_defaults(&mut self) {}
}

/// Child fields a record excludes from allocation and defaulting.
pub trait NullableFields {
    /// Names of fields left exactly as decoded.
    const NULLABLE_FIELDS: &'static [&'static str] = &[];

    /// Returns true when `field` must not be visited.
    #[must_use]
    fn is_nullable(field: &str) -> bool {
        Self::NULLABLE_FIELDS.contains(&field)
    }
}

/// Recursive traversal that defaults a node and everything below it.
pub trait PopulateDefaults {
    /// Defaults children first, then this node.
    fn populate_defaults(&mut self);
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Applies defaults to a whole decoded tree.
pub fn apply_defaults<T: PopulateDefaults + ?Sized>(node: &mut T) {
    node.populate_defaults();
}

// ============================================================================
// SECTION: Container Traversal
// ============================================================================

impl<T: PopulateDefaults> PopulateDefaults for Vec<T> {
    fn populate_defaults(&mut self) {
        for element in self.iter_mut() {
            element.populate_defaults();
        }
    }
}

impl<K: Ord, V: PopulateDefaults> PopulateDefaults for BTreeMap<K, V> {
    fn populate_defaults(&mut self) {
        for value in self.values_mut() {
            value.populate_defaults();
        }
    }
}

impl<T: PopulateDefaults + Default> PopulateDefaults for Option<T> {
    fn populate_defaults(&mut self) {
        self.get_or_insert_with(T::default).populate_defaults();
    }
}

// ============================================================================
// SECTION: Record Walk
// ============================================================================

/// Implements [`PopulateDefaults`] for a record.
///
/// List the fields holding records or containers of records; scalar fields
/// are defaulted by the record's own [`SetDefaults`] routine. The record must
/// implement [`SetDefaults`] and [`NullableFields`].
///
/// ```ignore
/// populate_defaults!(HookConfig { blocking_handlers, non_blocking_handlers });
/// populate_defaults!(SmtpServerCredentials {});
/// ```
#[macro_export]
macro_rules! populate_defaults {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::defaults::PopulateDefaults for $ty {
            fn populate_defaults(&mut self) {
                $(
                    if !<$ty as $crate::defaults::NullableFields>::is_nullable(stringify!($field)) {
                        $crate::defaults::PopulateDefaults::populate_defaults(&mut self.$field);
                    }
                )*
                $crate::defaults::SetDefaults::set_defaults(self);
            }
        }
    };
}

// ============================================================================
// SECTION: Tests
// ============================================================================

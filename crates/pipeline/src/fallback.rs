//! Deterministic fallback ordering.
//!
//! The terminal safety net for every planning path: it cannot fail, does
//! no I/O and always yields a valid ordering when `target_count` equals the
//! number of items.

use shot_types::{ItemId, ItemSet};

/// Ids in original request order, truncated to `target_count`.
pub fn fallback_order(items: &ItemSet, target_count: usize) -> Vec<ItemId> {
    items
        .ids()
        .take(target_count)
        .map(str::to_string)
        .collect()
}

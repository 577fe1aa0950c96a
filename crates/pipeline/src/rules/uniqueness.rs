//! Rule rejecting repeated ids.
//!
//! Length and membership alone accept `[a, a, b]` for items `{a, b, c}`;
//! this rule closes that gap so a valid ordering is a true permutation.

use crate::traits::{Rule, RuleViolation};
use shot_types::{ItemId, ItemSet};
use std::collections::HashSet;

pub struct UniquenessRule;

impl Rule for UniquenessRule {
    fn name(&self) -> &str {
        "UniquenessRule"
    }

    fn check(
        &self,
        ordered_ids: &[ItemId],
        _items: &ItemSet,
        _target_count: usize,
    ) -> Result<(), RuleViolation> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            if !seen.insert(id.as_str()) {
                return Err(RuleViolation::DuplicateId(id.clone()));
            }
        }
        Ok(())
    }
}

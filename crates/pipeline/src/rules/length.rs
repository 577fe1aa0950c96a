//! Rule requiring the ordering to cover exactly the target count.

use crate::traits::{Rule, RuleViolation};
use shot_types::{ItemId, ItemSet};

/// Rejects orderings whose length differs from the target count.
pub struct LengthRule;

impl Rule for LengthRule {
    fn name(&self) -> &str {
        "LengthRule"
    }

    fn check(
        &self,
        ordered_ids: &[ItemId],
        _items: &ItemSet,
        target_count: usize,
    ) -> Result<(), RuleViolation> {
        if ordered_ids.len() != target_count {
            return Err(RuleViolation::WrongLength {
                expected: target_count,
                actual: ordered_ids.len(),
            });
        }
        Ok(())
    }
}

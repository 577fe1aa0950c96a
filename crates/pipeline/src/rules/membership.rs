//! Rule rejecting ids that were never part of the request.

use crate::traits::{Rule, RuleViolation};
use shot_types::{ItemId, ItemSet};

/// Every id must belong to the item set.
///
/// ## Algorithm
/// Uses the ItemSet's id index for O(1) lookups.
pub struct MembershipRule;

impl Rule for MembershipRule {
    fn name(&self) -> &str {
        "MembershipRule"
    }

    fn check(
        &self,
        ordered_ids: &[ItemId],
        items: &ItemSet,
        _target_count: usize,
    ) -> Result<(), RuleViolation> {
        match ordered_ids.iter().find(|id| !items.contains(id)) {
            Some(foreign) => Err(RuleViolation::UnknownId(foreign.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{ids, item_set};

    #[test]
    fn test_membership_rule() {
        let items = item_set(&["a", "b", "c"]);

        assert!(MembershipRule.check(&ids(&["c", "a", "b"]), &items, 3).is_ok());
        assert_eq!(
            MembershipRule.check(&ids(&["a", "x", "b"]), &items, 3),
            Err(RuleViolation::UnknownId("x".to_string()))
        );
    }
}

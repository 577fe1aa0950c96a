//! The ValidationPipeline runs a candidate ordering through every rule.
//!
//! This module provides the ValidationPipeline struct that chains
//! rules together using the builder pattern.

use crate::rules::{LengthRule, MembershipRule, UniquenessRule};
use crate::traits::{Rule, RuleViolation};
use shot_types::{ItemId, ItemSet};

/// Chains multiple rules together into a single validation gate.
///
/// ## Usage
/// ```ignore
/// let pipeline = ValidationPipeline::new()
///     .add_rule(LengthRule)
///     .add_rule(MembershipRule)
///     .add_rule(UniquenessRule);
///
/// pipeline.validate(candidate.ordered_ids.as_deref(), &items, items.len())?;
/// ```
pub struct ValidationPipeline {
    rules: Vec<Box<dyn Rule>>,
}

impl ValidationPipeline {
    /// Create a new empty ValidationPipeline.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Length, membership and uniqueness: together they accept exactly the
    /// permutations of the item ids when `target_count == items.len()`.
    pub fn standard() -> Self {
        Self::new()
            .add_rule(LengthRule)
            .add_rule(MembershipRule)
            .add_rule(UniquenessRule)
    }

    /// Add a rule to the pipeline (builder pattern).
    pub fn add_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Check the candidate against every rule in order.
    ///
    /// `None` stands for an ordering that was absent or not an array in
    /// the model output and is rejected before any rule runs.
    ///
    /// # Returns
    /// * `Ok(())` - The ordering passed every rule
    /// * `Err` - The first violation found
    pub fn validate(
        &self,
        ordered_ids: Option<&[ItemId]>,
        items: &ItemSet,
        target_count: usize,
    ) -> Result<(), RuleViolation> {
        let ordered_ids = ordered_ids.ok_or(RuleViolation::NotASequence)?;
        for rule in &self.rules {
            tracing::debug!("Applying rule: {} ({} ids)", rule.name(), ordered_ids.len());
            if let Err(violation) = rule.check(ordered_ids, items, target_count) {
                tracing::debug!("Rule {} rejected ordering: {}", rule.name(), violation);
                return Err(violation);
            }
        }
        Ok(())
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

/// Boolean form of the standard pipeline.
pub fn is_valid_selection(
    ordered_ids: Option<&[ItemId]>,
    items: &ItemSet,
    target_count: usize,
) -> bool {
    ValidationPipeline::standard()
        .validate(ordered_ids, items, target_count)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{ids, item_set};

    #[test]
    fn test_empty_pipeline_only_rejects_missing() {
        let pipeline = ValidationPipeline::new();
        let items = item_set(&["a", "b"]);

        assert!(pipeline.validate(Some(ids(&["zzz"]).as_slice()), &items, 2).is_ok());
        assert_eq!(
            pipeline.validate(None, &items, 2),
            Err(RuleViolation::NotASequence)
        );
    }

    #[test]
    fn test_standard_pipeline_accepts_permutation() {
        let items = item_set(&["a", "b", "c"]);
        assert!(is_valid_selection(Some(ids(&["c", "a", "b"]).as_slice()), &items, 3));
    }

    #[test]
    fn test_standard_pipeline_rejections() {
        let items = item_set(&["a", "b", "c"]);

        assert!(!is_valid_selection(None, &items, 3));
        assert!(!is_valid_selection(Some(&[][..]), &items, 3));
        assert!(!is_valid_selection(Some(ids(&["a", "b"]).as_slice()), &items, 3));
        assert!(!is_valid_selection(Some(ids(&["a", "b", "q"]).as_slice()), &items, 3));
        assert!(!is_valid_selection(Some(ids(&["a", "a", "b"]).as_slice()), &items, 3));
    }

    #[test]
    fn test_rules_run_in_order() {
        let items = item_set(&["a", "b", "c"]);
        let result = ValidationPipeline::standard().validate(Some(ids(&["x", "x"]).as_slice()), &items, 3);
        assert!(matches!(result, Err(RuleViolation::WrongLength { .. })));
    }
}

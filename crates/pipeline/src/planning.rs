//! The synchronous half of sequence planning: raw model text in, plan out.
//!
//! Only an ordering that parses and passes every rule is used. Anything else
//! yields the fallback plan, and the model's theme, arc and beats are
//! discarded along with its ordering.

use shot_types::{FinalPlan, ItemSet, PlannerKind};
use tracing::warn;

use crate::candidate::CandidatePlan;
use crate::response::parse_json;
use crate::rule_pipeline::ValidationPipeline;
use crate::shots::{assemble_plan, fallback_plan};
use crate::traits::RuleViolation;

/// How a planning run ended. Logged for telemetry; callers only see the plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    /// The model's ordering passed validation
    Accepted,
    /// The output was not JSON
    Unparseable,
    /// The ordering broke a rule
    Rejected(RuleViolation),
    /// No answer within the timeout
    TimedOut,
    /// The call itself failed
    Failed(String),
}

/// Parse, validate and assemble one model reply.
pub fn plan_from_output(
    validator: &ValidationPipeline,
    items: &ItemSet,
    target_count: usize,
    raw: &str,
) -> (FinalPlan, PlanOutcome) {
    let value = match parse_json(raw) {
        Ok(value) => value,
        Err(e) => {
            let preview: String = raw.chars().take(200).collect();
            warn!("Planner output unparseable ({}): {:?}, using fallback order", e, preview);
            return (fallback_plan(items, None), PlanOutcome::Unparseable);
        }
    };

    let mut candidate = CandidatePlan::from_value(&value);
    if let Err(violation) = validator.validate(candidate.ordered_ids.as_deref(), items, target_count) {
        warn!("Planner ordering rejected: {}, using fallback order", violation);
        return (fallback_plan(items, None), PlanOutcome::Rejected(violation));
    }

    candidate.retain_known_arc_ids(items);
    let ordered_ids = candidate.ordered_ids.take().unwrap_or_default();
    (
        assemble_plan(items, ordered_ids, Some(&candidate), PlannerKind::Ai),
        PlanOutcome::Accepted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::item_set;

    #[test]
    fn test_accepted_plan_keeps_model_metadata() {
        let items = item_set(&["a", "b", "c"]);
        let raw = r#"{"theme": "dusk", "orderedIds": ["c", "a", "b"],
                      "emotion_arc": [{"beat": "calm", "ids": ["c", "ghost"]}]}"#;

        let (plan, outcome) = plan_from_output(&ValidationPipeline::standard(), &items, 3, raw);

        assert_eq!(outcome, PlanOutcome::Accepted);
        assert_eq!(plan.used_planner, PlannerKind::Ai);
        assert_eq!(plan.theme, "dusk");
        assert_eq!(plan.emotion_arc[0].ids, vec!["c".to_string()]);
    }

    #[test]
    fn test_non_id_entries_are_not_repaired() {
        let items = item_set(&["a", "b", "c"]);
        let raw = r#"{"theme": "t", "orderedIds": ["c", null, "a", "", "b"]}"#;

        let (plan, outcome) = plan_from_output(&ValidationPipeline::standard(), &items, 3, raw);

        assert_eq!(outcome, PlanOutcome::Rejected(RuleViolation::NotASequence));
        assert_eq!(plan.used_planner, PlannerKind::Fallback);
        assert_eq!(plan.ordered_ids, vec!["a", "b", "c"]);
        assert!(plan.theme.is_empty());
    }

    #[test]
    fn test_unparseable_output_discards_everything() {
        let items = item_set(&["a", "b"]);

        let (plan, outcome) =
            plan_from_output(&ValidationPipeline::standard(), &items, 2, "order: b, a");

        assert_eq!(outcome, PlanOutcome::Unparseable);
        assert_eq!(plan.used_planner, PlannerKind::Fallback);
        assert!(plan.error.is_none());
    }
}

//! Shot assembly for final plans.
//!
//! Turns an accepted ordering (model-derived or fallback) into the
//! FinalPlan contract: one shot per id, original indices, fixed durations
//! and transitions.

use crate::candidate::CandidatePlan;
use crate::fallback::fallback_order;
use shot_types::{FinalPlan, ItemId, ItemSet, PlannerKind, SHOT_DURATION, Shot, TRANSITION};

pub const ROLE_OPENING: &str = "opening";
pub const ROLE_BUILD: &str = "build";
pub const ROLE_TURN: &str = "turn";
pub const ROLE_RESOLUTION: &str = "resolution";

/// Narrative role from relative position in the sequence.
///
/// Position runs from 0.0 (first shot) to 1.0 (last shot): the first 20%
/// opens, up to 60% builds, up to 90% turns, the rest resolves.
pub fn role_for_position(index: usize, total: usize) -> &'static str {
    let position = if total <= 1 {
        0.0
    } else {
        index as f64 / (total - 1) as f64
    };

    if position < 0.2 {
        ROLE_OPENING
    } else if position < 0.6 {
        ROLE_BUILD
    } else if position < 0.9 {
        ROLE_TURN
    } else {
        ROLE_RESOLUTION
    }
}

/// Assemble a FinalPlan for an already-validated ordering.
///
/// With `narrative`, shot roles and reasons come from matching beats and
/// theme/arc are carried over; without it every role is positional.
pub fn assemble_plan(
    items: &ItemSet,
    ordered_ids: Vec<ItemId>,
    narrative: Option<&CandidatePlan>,
    used_planner: PlannerKind,
) -> FinalPlan {
    let total = ordered_ids.len();

    let shots: Vec<Shot> = ordered_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let beat = narrative.and_then(|plan| plan.beat_for(id));
            Shot {
                id: id.clone(),
                role: beat
                    .and_then(|b| b.role.clone())
                    .unwrap_or_else(|| role_for_position(index, total).to_string()),
                reason: beat.and_then(|b| b.reason.clone()).unwrap_or_default(),
            }
        })
        .collect();

    // Unreachable after validation, but a missing id maps to index 0
    // rather than failing the request.
    let selected = ordered_ids
        .iter()
        .map(|id| items.position_of(id).unwrap_or(0))
        .collect();

    FinalPlan {
        theme: narrative.map(|plan| plan.theme.clone()).unwrap_or_default(),
        emotion_arc: narrative
            .map(|plan| plan.emotion_arc.clone())
            .unwrap_or_default(),
        shots,
        selected,
        order: (0..total).collect(),
        durations: vec![SHOT_DURATION; total],
        transitions: vec![TRANSITION.to_string(); total.saturating_sub(1)],
        ordered_ids,
        used_planner,
        error: None,
    }
}

/// The safety-net plan: original order, positional roles, no narrative.
pub fn fallback_plan(items: &ItemSet, error: Option<String>) -> FinalPlan {
    let ordered_ids = fallback_order(items, items.len());
    FinalPlan {
        error,
        ..assemble_plan(items, ordered_ids, None, PlannerKind::Fallback)
    }
}

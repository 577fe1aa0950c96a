//! Core domain types for shot planning.
//!
//! Everything here lives for a single request: items are built from the
//! request body, plans are built once and returned. Nothing is persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;

// =============================================================================
// Type Aliases and Constants
// =============================================================================

/// Identifier of an item, unique within one request
pub type ItemId = String;

/// Energy assigned when an analysis carries no usable value
pub const DEFAULT_VISUAL_ENERGY: f64 = 5.0;

/// Valid range for `visual_energy`
pub const VISUAL_ENERGY_RANGE: std::ops::RangeInclusive<f64> = 1.0..=10.0;

/// Seconds each shot stays on screen
pub const SHOT_DURATION: f64 = 3.8;

/// Transition emitted between every adjacent pair of shots
pub const TRANSITION: &str = "crossfade";

// =============================================================================
// Analysis Types
// =============================================================================

/// How well an image fits a narrative role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleScore {
    pub role: String,
    pub score: f64,
}

/// Cinematic attributes of one image.
///
/// `composition` is opaque to the planner and passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAnalysis {
    pub subject: String,
    pub mood: Vec<String>,
    pub composition: Value,
    pub visual_energy: f64,
    pub best_role: Vec<RoleScore>,
}

impl ItemAnalysis {
    /// The canned analysis substituted whenever the model cannot produce one.
    pub fn fallback() -> Self {
        Self {
            subject: "unclear".to_string(),
            mood: Vec::new(),
            composition: json!({
                "shot_type": "medium",
                "angle": "eye-level",
                "balance": "neutral",
            }),
            visual_energy: DEFAULT_VISUAL_ENERGY,
            best_role: Vec::new(),
        }
    }
}

impl Default for ItemAnalysis {
    fn default() -> Self {
        Self::fallback()
    }
}

/// One image under consideration for a sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub filename: String,
    pub analysis: ItemAnalysis,
}

/// The immutable item set of one request, indexed by id.
///
/// Built through [`ItemSet::new`] (see `index.rs`), which guarantees ids
/// are unique.
#[derive(Debug, Clone, Default)]
pub struct ItemSet {
    pub(crate) items: Vec<Item>,
    pub(crate) positions: HashMap<ItemId, usize>,
}

// =============================================================================
// Vision Types
// =============================================================================

/// A photo submitted for analysis. `data` is base64 and never decoded here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoInput {
    pub filename: String,
    pub data: String,
    #[serde(rename = "mimeType", default = "default_mime_type")]
    pub mime_type: String,
}

pub fn default_mime_type() -> String {
    "image/jpeg".to_string()
}

/// Analysis returned for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub analysis: ItemAnalysis,
}

// =============================================================================
// Plan Types
// =============================================================================

/// Which path produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerKind {
    Ai,
    Fallback,
}

/// One labelled section of the emotional arc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcBeat {
    pub beat: String,
    pub ids: Vec<ItemId>,
}

/// One shot of the final sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: ItemId,
    pub role: String,
    pub reason: String,
}

/// The validated plan returned to callers.
///
/// `ordered_ids` is always a permutation of the request's ids, with one
/// shot, duration and `selected` entry per id and one transition between
/// each adjacent pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalPlan {
    pub theme: String,
    pub emotion_arc: Vec<ArcBeat>,
    pub ordered_ids: Vec<ItemId>,
    pub shots: Vec<Shot>,
    pub selected: Vec<usize>,
    pub order: Vec<usize>,
    pub durations: Vec<f64>,
    pub transitions: Vec<String>,
    #[serde(rename = "usedPlanner")]
    pub used_planner: PlannerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_plan_wire_keys() {
        let plan = FinalPlan {
            theme: String::new(),
            emotion_arc: vec![],
            ordered_ids: vec!["a".into()],
            shots: vec![Shot {
                id: "a".into(),
                role: "opening".into(),
                reason: String::new(),
            }],
            selected: vec![0],
            order: vec![0],
            durations: vec![SHOT_DURATION],
            transitions: vec![],
            used_planner: PlannerKind::Fallback,
            error: None,
        };

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["usedPlanner"], "fallback");
        assert_eq!(value["ordered_ids"][0], "a");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_photo_input_defaults_mime_type() {
        let photo: PhotoInput =
            serde_json::from_value(json!({"filename": "a.jpg", "data": "AAAA"})).unwrap();
        assert_eq!(photo.mime_type, "image/jpeg");
    }

    #[test]
    fn test_fallback_analysis_is_neutral() {
        let analysis = ItemAnalysis::fallback();
        assert_eq!(analysis.visual_energy, DEFAULT_VISUAL_ENERGY);
        assert!(analysis.mood.is_empty());
        assert!(analysis.best_role.is_empty());
        assert_eq!(analysis.composition["shot_type"], "medium");
    }
}

//! Prompt construction for both endpoints.

use serde::Serialize;
use shot_types::{ItemSet, PhotoInput};

pub const VISION_SYSTEM: &str = "You are a film editor's assistant. You describe still images \
in cinematic terms and answer with a single JSON object only, no prose, no markdown.";

pub const SEQUENCE_SYSTEM: &str = "You are a film editor. You order still images into a short \
narrative sequence and answer with a single JSON object only, no prose, no markdown.";

/// Compact per-item projection sent to the planner model.
///
/// Only the fields the model needs to order shots, so a 200-item request
/// stays well inside the context window.
#[derive(Debug, Serialize)]
pub struct PlanningEntry<'a> {
    pub id: &'a str,
    pub subject: &'a str,
    pub mood: &'a [String],
    pub energy: f64,
    pub roles: Vec<&'a str>,
}

pub fn planning_entries(items: &ItemSet) -> Vec<PlanningEntry<'_>> {
    items
        .items()
        .iter()
        .map(|item| PlanningEntry {
            id: &item.id,
            subject: &item.analysis.subject,
            mood: &item.analysis.mood,
            energy: item.analysis.visual_energy,
            roles: item
                .analysis
                .best_role
                .iter()
                .take(3)
                .map(|r| r.role.as_str())
                .collect(),
        })
        .collect()
}

pub fn sequence_prompt(items: &ItemSet, direction: Option<&str>) -> String {
    let entries = serde_json::to_string(&planning_entries(items)).unwrap_or_else(|_| "[]".to_string());
    let direction = direction
        .map(|text| format!("Creative direction from the user: {text}\n\n"))
        .unwrap_or_default();

    format!(
        "{direction}Order ALL {count} images below into one narrative sequence. \
Use every id exactly once and no other ids.\n\n\
Images:\n{entries}\n\n\
Respond with JSON of this shape:\n\
{{\"theme\": string, \"orderedIds\": [id, ...], \
\"emotion_arc\": [{{\"beat\": string, \"ids\": [id, ...]}}], \
\"beats\": [{{\"id\": id, \"role\": \"opening\"|\"build\"|\"turn\"|\"resolution\", \"reason\": string}}]}}",
        count = items.len(),
    )
}

pub fn vision_prompt(photo: &PhotoInput) -> String {
    format!(
        "Analyze the image \"{}\". Respond with JSON of this shape:\n\
{{\"subject\": string, \"mood\": [string], \
\"composition\": {{\"shot_type\": string, \"angle\": string, \"balance\": string}}, \
\"visual_energy\": number from 1 to 10, \
\"best_role\": [{{\"role\": \"opening\"|\"build\"|\"turn\"|\"resolution\", \"score\": number from 0 to 1}}]}}",
        photo.filename
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shot_types::normalize::items_from_values;

    #[test]
    fn test_sequence_prompt_lists_every_id() {
        let items = items_from_values(&[
            json!({"id": "a", "subject": "pier", "best_role": [{"role": "opening", "score": 0.9}]}),
            json!({"id": "b", "subject": "gulls"}),
        ]);

        let prompt = sequence_prompt(&items, Some("keep it quiet"));

        assert!(prompt.starts_with("Creative direction from the user: keep it quiet"));
        assert!(prompt.contains("ALL 2 images"));
        assert!(prompt.contains(r#""id":"a""#));
        assert!(prompt.contains(r#""roles":["opening"]"#));
        assert!(prompt.contains(r#""id":"b""#));
    }

    #[test]
    fn test_projection_drops_composition() {
        let items = items_from_values(&[json!({"id": "a", "composition": {"notes": "x".repeat(1000)}})]);
        let prompt = sequence_prompt(&items, None);
        assert!(!prompt.contains("notes"));
    }
}

//! Projection of raw model output into a Candidate Plan.
//!
//! The model's JSON is never deserialized into a trusted type. Each field
//! is read defensively here and the result still has to pass the
//! ValidationPipeline before its ordering is used.

use serde_json::Value;
use shot_types::normalize::id_from_value;
use shot_types::{ArcBeat, ItemId, ItemSet};

/// Per-id narrative annotation from the model
#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    pub id: ItemId,
    pub role: Option<String>,
    pub reason: Option<String>,
}

/// Untrusted plan data read from one model response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidatePlan {
    /// `None` when the ordering key held something other than an array of ids
    pub ordered_ids: Option<Vec<ItemId>>,
    pub theme: String,
    pub emotion_arc: Vec<ArcBeat>,
    pub beats: Vec<Beat>,
}

impl CandidatePlan {
    /// Read a plan from parsed model output.
    ///
    /// The ordering is taken from `orderedIds`, else `ordered_ids`; when
    /// neither key exists it is empty, which fails validation.
    pub fn from_value(value: &Value) -> Self {
        let ordered_ids = match value.get("orderedIds").or_else(|| value.get("ordered_ids")) {
            None => Some(Vec::new()),
            Some(ids) => ordering_from_value(ids),
        };

        let theme = value
            .get("theme")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let emotion_arc = value
            .get("emotion_arc")
            .and_then(Value::as_array)
            .map(|beats| beats.iter().filter_map(arc_beat_from_value).collect())
            .unwrap_or_default();

        let beats = value
            .get("beats")
            .and_then(Value::as_array)
            .map(|beats| beats.iter().filter_map(beat_from_value).collect())
            .unwrap_or_default();

        Self {
            ordered_ids,
            theme,
            emotion_arc,
            beats,
        }
    }

    /// Drop arc ids that are not part of the request.
    pub fn retain_known_arc_ids(&mut self, items: &ItemSet) {
        for beat in &mut self.emotion_arc {
            beat.ids.retain(|id| items.contains(id));
        }
    }

    /// First beat annotating this id
    pub fn beat_for(&self, id: &str) -> Option<&Beat> {
        self.beats.iter().find(|beat| beat.id == id)
    }
}

/// Read an ordering as a whole. Any entry that is not an id (null, blank,
/// nested) voids the ordering rather than being skipped, so the length rule
/// sees what the model actually sent.
pub fn ordering_from_value(value: &Value) -> Option<Vec<ItemId>> {
    value.as_array()?.iter().map(id_from_value).collect()
}

fn arc_beat_from_value(value: &Value) -> Option<ArcBeat> {
    let label = value
        .get("beat")
        .or_else(|| value.get("label"))
        .and_then(Value::as_str)?;
    let ids = value
        .get("ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(id_from_value).collect())
        .unwrap_or_default();
    Some(ArcBeat {
        beat: label.to_string(),
        ids,
    })
}

fn beat_from_value(value: &Value) -> Option<Beat> {
    let text = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Some(Beat {
        id: value.get("id").and_then(id_from_value)?,
        role: text("role"),
        reason: text("reason"),
    })
}

//! Normalization of loosely-typed request and model data.
//!
//! Request bodies and model output are both untrusted. They are read as
//! `serde_json::Value` and projected field by field into the domain types
//! here, so a missing or mistyped field degrades to a default instead of
//! rejecting the whole entry.

use crate::error::{InputError, Result};
use crate::types::{
    DEFAULT_VISUAL_ENERGY, Item, ItemAnalysis, ItemSet, PhotoInput, RoleScore,
    VISUAL_ENERGY_RANGE, default_mime_type,
};
use serde_json::Value;

/// Read a batch array out of a request body, enforcing the size cap.
pub fn batch_entries<'a>(body: &'a Value, field: &str, max: usize) -> Result<&'a [Value]> {
    let entries = body
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| InputError::NotASequence {
            field: field.to_string(),
        })?;

    if entries.is_empty() {
        return Err(InputError::EmptyBatch {
            field: field.to_string(),
        });
    }
    if entries.len() > max {
        return Err(InputError::BatchTooLarge {
            field: field.to_string(),
            count: entries.len(),
            max,
        });
    }
    Ok(entries)
}

/// String-normalize an id value. Numbers are accepted, blanks are not.
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build the request's ItemSet from raw analysis entries.
///
/// Id priority: explicit `id`, then `filename`, then the entry's position.
/// The analysis bag is read from a nested `analysis` object when present,
/// otherwise from the entry itself.
pub fn items_from_values(entries: &[Value]) -> ItemSet {
    let base = ItemAnalysis::fallback();
    let items = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let filename = entry
                .get("filename")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let id = entry
                .get("id")
                .and_then(id_from_value)
                .or_else(|| entry.get("filename").and_then(id_from_value))
                .unwrap_or_else(|| index.to_string());
            let source = match entry.get("analysis") {
                Some(nested @ Value::Object(_)) => nested,
                _ => entry,
            };
            Item {
                id,
                filename,
                analysis: project_analysis(source, &base),
            }
        })
        .collect();
    ItemSet::new(items)
}

/// Project an untyped analysis object, taking `base` for anything unusable.
pub fn project_analysis(value: &Value, base: &ItemAnalysis) -> ItemAnalysis {
    let subject = value
        .get("subject")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| base.subject.clone());

    let mood = match value.get("mood") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(tag)) if !tag.is_empty() => vec![tag.clone()],
        _ => base.mood.clone(),
    };

    let composition = match value.get("composition") {
        Some(Value::Null) | None => base.composition.clone(),
        Some(other) => other.clone(),
    };

    let best_role = match value.get("best_role") {
        Some(Value::Array(roles)) => roles.iter().filter_map(role_score_from_value).collect(),
        _ => base.best_role.clone(),
    };

    ItemAnalysis {
        subject,
        mood,
        composition,
        visual_energy: visual_energy_from_value(value.get("visual_energy")),
        best_role,
    }
}

/// Energy in 1..=10, or the default when missing, non-numeric or out of range.
pub fn visual_energy_from_value(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|energy| energy.is_finite() && VISUAL_ENERGY_RANGE.contains(energy))
        .unwrap_or(DEFAULT_VISUAL_ENERGY)
}

fn role_score_from_value(value: &Value) -> Option<RoleScore> {
    match value {
        Value::Object(_) => Some(RoleScore {
            role: value.get("role")?.as_str()?.to_string(),
            score: value.get("score").and_then(Value::as_f64).unwrap_or(0.0),
        }),
        Value::String(role) => Some(RoleScore {
            role: role.clone(),
            score: 0.0,
        }),
        _ => None,
    }
}

/// Read photo entries. Only `data` is mandatory.
pub fn photos_from_values(entries: &[Value]) -> Result<Vec<PhotoInput>> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let data = entry
                .get("data")
                .and_then(Value::as_str)
                .filter(|data| !data.is_empty())
                .ok_or_else(|| InputError::MissingField {
                    field: "photos".to_string(),
                    index,
                    key: "data".to_string(),
                })?;
            let filename = entry
                .get("filename")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("photo-{}", index + 1));
            let mime_type = entry
                .get("mimeType")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(default_mime_type);
            Ok(PhotoInput {
                filename,
                data: data.to_string(),
                mime_type,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_priority() {
        let entries = vec![
            json!({"id": "hero", "filename": "a.jpg"}),
            json!({"filename": "b.jpg"}),
            json!({"subject": "dog"}),
            json!({"id": 42}),
        ];
        let set = items_from_values(&entries);
        let ids: Vec<&str> = set.ids().collect();
        assert_eq!(ids, vec!["hero", "b.jpg", "2", "42"]);
    }

    #[test]
    fn test_nested_and_flat_analysis() {
        let entries = vec![
            json!({"filename": "a.jpg", "analysis": {"subject": "harbor", "mood": ["calm"], "visual_energy": 3}}),
            json!({"filename": "b.jpg", "subject": "market", "visual_energy": 9}),
        ];
        let set = items_from_values(&entries);
        let items = set.items();
        assert_eq!(items[0].analysis.subject, "harbor");
        assert_eq!(items[0].analysis.mood, vec!["calm".to_string()]);
        assert_eq!(items[0].analysis.visual_energy, 3.0);
        assert_eq!(items[1].analysis.subject, "market");
        assert_eq!(items[1].analysis.visual_energy, 9.0);
    }

    #[test]
    fn test_visual_energy_defaults() {
        assert_eq!(visual_energy_from_value(None), DEFAULT_VISUAL_ENERGY);
        assert_eq!(visual_energy_from_value(Some(&json!("loud"))), DEFAULT_VISUAL_ENERGY);
        assert_eq!(visual_energy_from_value(Some(&json!(0))), DEFAULT_VISUAL_ENERGY);
        assert_eq!(visual_energy_from_value(Some(&json!(11.5))), DEFAULT_VISUAL_ENERGY);
        assert_eq!(visual_energy_from_value(Some(&json!("7"))), 7.0);
        assert_eq!(visual_energy_from_value(Some(&json!(10))), 10.0);
    }

    #[test]
    fn test_best_role_projection_skips_garbage() {
        let value = json!({"best_role": [{"role": "opening", "score": 0.8}, 7, {"score": 1}, "turn"]});
        let analysis = project_analysis(&value, &ItemAnalysis::fallback());
        assert_eq!(analysis.best_role.len(), 2);
        assert_eq!(analysis.best_role[0].role, "opening");
        assert_eq!(analysis.best_role[1].role, "turn");
    }

    #[test]
    fn test_batch_entries_rejections() {
        let body = json!({"photos": "nope"});
        assert!(matches!(
            batch_entries(&body, "photos", 36),
            Err(InputError::NotASequence { .. })
        ));

        let body = json!({"photos": []});
        assert!(matches!(
            batch_entries(&body, "photos", 36),
            Err(InputError::EmptyBatch { .. })
        ));

        let body = json!({"photos": vec![json!({}); 40]});
        assert_eq!(
            batch_entries(&body, "photos", 36),
            Err(InputError::BatchTooLarge {
                field: "photos".to_string(),
                count: 40,
                max: 36
            })
        );

        let body = json!({});
        assert!(batch_entries(&body, "photos", 36).is_err());
    }

    #[test]
    fn test_photos_require_data() {
        let entries = vec![json!({"filename": "a.jpg", "data": "AAAA", "mimeType": "image/png"}), json!({"filename": "b.jpg"})];
        let err = photos_from_values(&entries).unwrap_err();
        assert!(matches!(err, InputError::MissingField { index: 1, .. }));

        let photos = photos_from_values(&entries[..1]).unwrap();
        assert_eq!(photos[0].mime_type, "image/png");
    }
}

//! Parsing of free-form model output.
//!
//! Models frequently wrap JSON in markdown fences or add a sentence of
//! preamble. The functions here strip that noise and parse strictly;
//! `parse_or` is total and never propagates a failure.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Why model output could not be read as JSON
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model output is empty")]
    Empty,

    #[error("model output is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Remove a leading ```` ``` ```` fence (with optional language tag) and a
/// trailing fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        // The language tag runs to the end of the opening line.
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Strictly parse model output after stripping fences.
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(serde_json::from_str(body)?)
}

/// Parse model output, returning `fallback` unchanged on any failure.
pub fn parse_or(text: &str, fallback: Value) -> Value {
    match parse_json(text) {
        Ok(value) => value,
        Err(e) => {
            let preview: String = text.chars().take(200).collect();
            warn!("Unparseable model output ({}): {:?}", e, preview);
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        assert_eq!(parse_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_fenced_json_with_language_tag() {
        let text = "```json\n{\"orderedIds\": [\"a\", \"b\"]}\n```";
        assert_eq!(
            parse_json(text).unwrap(),
            json!({"orderedIds": ["a", "b"]})
        );
    }

    #[test]
    fn test_fenced_json_without_tag() {
        let text = "  ```\n[1, 2, 3]\n```  \n";
        assert_eq!(parse_json(text).unwrap(), json!([1, 2, 3]));
    }

    #[test]
    fn test_single_line_fence() {
        assert_eq!(strip_code_fences("```json{\"a\":true}```"), "{\"a\":true}");
    }

    #[test]
    fn test_parse_or_returns_fallback_on_garbage() {
        let fallback = json!({"orderedIds": ["x"]});
        let inputs = [
            "",
            "   ",
            "not json at all",
            "```json\n{broken\n```",
            "{\"a\": 1",
            "```",
            "``````",
            "Here you go: ```json {\"a\": 1}```",
        ];
        for input in inputs {
            assert_eq!(parse_or(input, fallback.clone()), fallback, "input: {input:?}");
        }
    }

    #[test]
    fn test_parse_or_handles_multibyte_text() {
        let fallback = json!(null);
        let text = "é".repeat(500);
        assert_eq!(parse_or(&text, fallback.clone()), fallback);
    }

    #[test]
    fn test_parse_or_prefers_parsed_value() {
        let parsed = parse_or("```json\n{\"theme\": \"tides\"}\n```", json!({}));
        assert_eq!(parsed["theme"], "tides");
    }
}

//! Reference snippet formatting.
//!
//! A retrieval match carries arbitrary metadata. Each one is rendered as a
//! short bracketed header (year, chapter, topic, marks) followed by the
//! question body. Matches without a body are dropped.

use paperforge_core::index::RetrievalMatch;
use serde_json::{Map, Value};

/// Metadata keys that may hold the snippet body, in priority order.
const BODY_KEYS: [&str; 4] = ["text", "question", "content", "prompt"];

/// Render one match as a snippet. Returns an empty string when its metadata
/// has no body field.
pub fn format_match(m: &RetrievalMatch) -> String {
    format_metadata(&m.metadata)
}

fn format_metadata(metadata: &Map<String, Value>) -> String {
    let Some(body) = BODY_KEYS
        .iter()
        .filter_map(|key| metadata.get(*key).and_then(scalar_text))
        .find(|text| !text.trim().is_empty())
    else {
        return String::new();
    };

    let mut parts = Vec::new();
    if let Some(year) = metadata.get("year").and_then(scalar_text) {
        parts.push(format!("Year: {year}"));
    }
    if let Some(chapter) = metadata.get("chapter").and_then(scalar_text) {
        parts.push(format!("Chapter: {chapter}"));
    }
    match metadata.get("topic").and_then(scalar_text) {
        Some(topic) => parts.push(format!("Topic: {topic}")),
        None => {
            if let Some(topics) = metadata.get("topics").and_then(topic_list) {
                parts.push(format!("Topics: {topics}"));
            }
        }
    }
    if let Some(marks) = metadata.get("marks").and_then(scalar_text) {
        parts.push(format!("Marks: {marks}"));
    }

    let header = if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(" | "))
    };

    format!("{header}\n{}", body.trim()).trim().to_string()
}

/// Format every match, dropping those that render empty. Order is preserved.
pub fn format_matches(matches: &[RetrievalMatch]) -> Vec<String> {
    matches
        .iter()
        .map(format_match)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Text of a truthy scalar. `null`, `false`, `0` and blank strings are absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".into()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Topics may be stored as a list or as a single string.
fn topic_list(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let topics: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!topics.is_empty()).then(|| topics.join(", "))
        }
        other => scalar_text(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn full_header_and_body() {
        let snippet = format_metadata(&meta(json!({
            "year": 2023,
            "chapter": "Electricity",
            "topic": "Ohm's law",
            "marks": 3,
            "text": "  State Ohm's law.  "
        })));
        assert_eq!(
            snippet,
            "[Year: 2023 | Chapter: Electricity | Topic: Ohm's law | Marks: 3]\nState Ohm's law."
        );
    }

    #[test]
    fn topics_used_only_without_topic() {
        let snippet = format_metadata(&meta(json!({
            "topics": [" Lenses ", "", "Refraction"],
            "question": "Define power of a lens."
        })));
        assert_eq!(snippet, "[Topics: Lenses, Refraction]\nDefine power of a lens.");

        let snippet = format_metadata(&meta(json!({
            "topic": "Mirrors",
            "topics": ["Lenses"],
            "content": "Q"
        })));
        assert_eq!(snippet, "[Topic: Mirrors]\nQ");
    }

    #[test]
    fn body_without_header() {
        assert_eq!(format_metadata(&meta(json!({ "prompt": "Explain." }))), "Explain.");
    }

    #[test]
    fn body_key_priority_skips_blanks() {
        let snippet = format_metadata(&meta(json!({ "text": "  ", "question": "Second", "content": "Third" })));
        assert_eq!(snippet, "Second");
    }

    #[test]
    fn no_body_means_empty() {
        assert_eq!(format_metadata(&meta(json!({ "chapter": "Heredity", "marks": 2 }))), "");
        assert_eq!(format_metadata(&Map::new()), "");
    }

    #[test]
    fn falsy_header_values_are_skipped() {
        let snippet = format_metadata(&meta(json!({
            "year": null,
            "chapter": "",
            "marks": 0,
            "text": "Body"
        })));
        assert_eq!(snippet, "Body");
    }

    #[test]
    fn format_matches_drops_empty_and_keeps_order() {
        let matches = vec![
            RetrievalMatch { id: "1".into(), score: 0.9, metadata: meta(json!({ "text": "first" })) },
            RetrievalMatch { id: "2".into(), score: 0.8, metadata: meta(json!({ "chapter": "Heredity" })) },
            RetrievalMatch { id: "3".into(), score: 0.7, metadata: meta(json!({ "question": "third" })) },
        ];
        assert_eq!(format_matches(&matches), vec!["first", "third"]);
    }
}

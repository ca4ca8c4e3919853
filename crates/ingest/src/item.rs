//! Per-item preparation: embedding text, metadata, and record ID.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// An item ready to be embedded and upserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub id: String,
    pub text: String,
    pub metadata: Map<String, Value>,
}

/// Prepare one input item. Items with no embeddable text yield `None`.
pub fn prepare_item(item: &Map<String, Value>) -> Option<PreparedItem> {
    let text = embedding_text(item);
    if text.is_empty() {
        return None;
    }

    let mut metadata = sanitize_metadata(item);
    metadata
        .entry("text")
        .or_insert_with(|| Value::String(text.clone()));
    metadata
        .entry("subject")
        .or_insert_with(|| Value::String("Science".into()));
    if !metadata.contains_key("classLevel") {
        let class_level = metadata.get("class").cloned().unwrap_or_else(|| Value::from(10));
        metadata.insert("classLevel".into(), class_level);
    }

    let id = item
        .get("id")
        .map(as_text)
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| stable_id(&text));

    Some(PreparedItem { id, text, metadata })
}

/// The text that gets embedded: labelled lines for each present field.
pub fn embedding_text(item: &Map<String, Value>) -> String {
    let field = |key: &str| item.get(key).map(as_text).unwrap_or_default();

    let question = ["text", "question", "prompt"]
        .iter()
        .map(|key| field(key))
        .find(|q| !q.is_empty())
        .unwrap_or_default();

    let topics = match item.get("topics") {
        Some(Value::Array(list)) => list
            .iter()
            .map(|t| as_text(t).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };

    let lines = [
        ("Chapter", field("chapter")),
        ("Topic", field("topic")),
        ("Topics", topics),
        ("Year", field("year")),
        ("Marks", field("marks")),
        ("Question", question),
        ("Answer", field("answer")),
    ];

    lines
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Reduce item fields to what the index accepts as metadata.
///
/// Drops `values`, `embedding` and nulls. Scalars are kept, lists of scalars
/// are kept without their nulls, and any other list or object is stored as
/// its JSON text.
pub fn sanitize_metadata(item: &Map<String, Value>) -> Map<String, Value> {
    item.iter()
        .filter(|(key, _)| !matches!(key.as_str(), "values" | "embedding"))
        .filter_map(|(key, value)| sanitize_value(value).map(|v| (key.clone(), v)))
        .collect()
}

fn sanitize_value(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.clone()),
        Value::Array(items) if items.iter().all(|v| !v.is_array() && !v.is_object()) => Some(
            Value::Array(items.iter().filter(|v| !v.is_null()).cloned().collect()),
        ),
        Value::Array(_) | Value::Object(_) => Some(Value::String(value.to_string())),
    }
}

/// Hex SHA-256 of the embedding text.
pub fn stable_id(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

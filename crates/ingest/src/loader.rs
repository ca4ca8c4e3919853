//! Input file loading.

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::IngestError;

/// Wrapper keys that may hold the item list, checked in order.
const LIST_KEYS: [&str; 4] = ["items", "data", "questions", "records"];

/// Read and parse an input file.
pub fn load_items(path: &Path) -> Result<Vec<Map<String, Value>>, IngestError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_items(&content)
}

/// Parse a JSON array of objects, or an object wrapping one under a known key.
pub fn parse_items(json: &str) -> Result<Vec<Map<String, Value>>, IngestError> {
    let data: Value = serde_json::from_str(json)?;

    let items = match data {
        Value::Array(items) => object_list(items).ok_or(IngestError::InvalidShape)?,
        Value::Object(mut wrapper) => LIST_KEYS
            .iter()
            .find_map(|key| match wrapper.remove(*key) {
                Some(Value::Array(items)) => object_list(items),
                _ => None,
            })
            .ok_or(IngestError::InvalidShape)?,
        _ => return Err(IngestError::InvalidShape),
    };

    if items.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(items)
}

fn object_list(items: Vec<Value>) -> Option<Vec<Map<String, Value>>> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

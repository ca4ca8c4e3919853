//! VectorIndex trait: the abstraction over the vector store of reference
//! questions.
//!
//! The store is namespaced. Queries take an embedding vector, a result limit,
//! and an optional metadata filter expressed in the Pinecone filter grammar
//! (`{"field": {"$eq": value}}`, `{"field": {"$in": [values]}}`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::error::IndexError;

/// A single scored match returned by a vector query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMatch {
    /// Record ID in the store
    pub id: String,

    /// Relevance score as reported by the store
    #[serde(default)]
    pub score: f32,

    /// Record metadata (chapter, topic(s), year, marks, text, ...)
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A record to upsert into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A single condition on one metadata field.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{"$eq": value}`
    Eq(Value),
    /// `{"$in": [values]}`
    In(Vec<Value>),
}

impl Condition {
    fn to_json(&self) -> Value {
        match self {
            Condition::Eq(v) => serde_json::json!({ "$eq": v }),
            Condition::In(vs) => serde_json::json!({ "$in": vs }),
        }
    }

    fn accepts(&self, actual: &Value) -> bool {
        match self {
            Condition::Eq(expected) => values_equal(actual, expected),
            Condition::In(options) => match actual {
                // List-valued metadata matches if any element is an option.
                Value::Array(items) => items
                    .iter()
                    .any(|item| options.iter().any(|o| values_equal(item, o))),
                _ => options.iter().any(|o| values_equal(actual, o)),
            },
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// A conjunction of field conditions, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataFilter {
    clauses: Vec<(String, Condition)>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value.into())));
        self
    }

    /// Add an inclusion clause.
    pub fn any_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.clauses.push((field.into(), Condition::In(values)));
        self
    }

    /// The condition on `field`, if any.
    pub fn condition(&self, field: &str) -> Option<&Condition> {
        self.clauses
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, c)| c)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render in the store's native filter grammar.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .clauses
            .iter()
            .map(|(field, cond)| (field.clone(), cond.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Evaluate against a record's metadata. A missing field never matches.
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|(field, cond)| {
            metadata
                .get(field)
                .is_some_and(|actual| cond.accepts(actual))
        })
    }
}

/// A vector query.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    /// Namespace (partition) to search
    pub namespace: String,

    /// The query embedding
    pub vector: Vec<f32>,

    /// Maximum number of matches
    pub top_k: usize,

    /// Optional metadata filter
    pub filter: Option<MetadataFilter>,
}

/// The core VectorIndex trait.
///
/// Implementations: Pinecone (REST data plane), in-memory (testing).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// The backend name (e.g., "pinecone", "in_memory").
    fn name(&self) -> &str;

    /// Query for the nearest records, sorted by descending score.
    async fn query(&self, query: IndexQuery) -> std::result::Result<Vec<RetrievalMatch>, IndexError>;

    /// Insert or replace records in a namespace. Returns the upserted count.
    async fn upsert(
        &self,
        namespace: &str,
        records: Vec<VectorRecord>,
    ) -> std::result::Result<usize, IndexError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn filter_renders_native_grammar() {
        let filter = MetadataFilter::new()
            .eq("subject", "Science")
            .eq("classLevel", 10)
            .any_of("chapter", ["Heredity", "Electricity"]);

        assert_eq!(
            filter.to_json(),
            json!({
                "subject": { "$eq": "Science" },
                "classLevel": { "$eq": 10 },
                "chapter": { "$in": ["Heredity", "Electricity"] }
            })
        );
    }

    #[test]
    fn filter_matches_equality_and_inclusion() {
        let filter = MetadataFilter::new()
            .eq("classLevel", 10)
            .any_of("chapter", ["Heredity"]);

        assert!(filter.matches(&meta(json!({"classLevel": 10.0, "chapter": "Heredity"}))));
        assert!(!filter.matches(&meta(json!({"classLevel": 10, "chapter": "Electricity"}))));
        assert!(!filter.matches(&meta(json!({"chapter": "Heredity"}))));
    }

    #[test]
    fn inclusion_matches_list_valued_metadata() {
        let filter = MetadataFilter::new().any_of("topics", ["Ohm's law"]);
        assert!(filter.matches(&meta(json!({"topics": ["Resistance", "Ohm's law"]}))));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MetadataFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&Map::new()));
        assert_eq!(filter.to_json(), json!({}));
    }
}

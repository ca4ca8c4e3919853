//! In-memory index for tests and local experimentation.

use async_trait::async_trait;
use paperforge_core::error::IndexError;
use paperforge_core::index::{IndexQuery, RetrievalMatch, VectorIndex, VectorRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::vector::cosine_similarity;

/// An index that keeps namespaced records in memory and ranks them by
/// cosine similarity. Evaluates the same `$eq` / `$in` filter grammar as the
/// hosted store.
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<VectorRecord>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Number of records stored in a namespace.
    pub async fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .map_or(0, Vec::len)
    }

    /// A stored record by ID.
    pub async fn get(&self, namespace: &str, id: &str) -> Option<VectorRecord> {
        self.namespaces
            .read()
            .await
            .get(namespace)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<RetrievalMatch>, IndexError> {
        let namespaces = self.namespaces.read().await;
        let Some(records) = namespaces.get(&query.namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<RetrievalMatch> = records
            .iter()
            .filter(|r| {
                query
                    .filter
                    .as_ref()
                    .is_none_or(|f| f.matches(&r.metadata))
            })
            .map(|r| RetrievalMatch {
                id: r.id.clone(),
                score: cosine_similarity(&r.values, &query.vector),
                metadata: r.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(query.top_k);
        Ok(matches)
    }

    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<usize, IndexError> {
        let count = records.len();
        let mut namespaces = self.namespaces.write().await;
        let stored = namespaces.entry(namespace.to_string()).or_default();

        for record in records {
            match stored.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => stored.push(record),
            }
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paperforge_core::index::MetadataFilter;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>, chapter: &str) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            values,
            metadata: json!({ "chapter": chapter, "classLevel": 10 })
                .as_object()
                .cloned()
                .unwrap(),
        }
    }

    fn query(vector: Vec<f32>, top_k: usize, filter: Option<MetadataFilter>) -> IndexQuery {
        IndexQuery {
            namespace: "ns".into(),
            vector,
            top_k,
            filter,
        }
    }

    #[tokio::test]
    async fn ranks_by_similarity_and_truncates() {
        let index = InMemoryIndex::new();
        index
            .upsert(
                "ns",
                vec![
                    record("far", vec![0.0, 1.0], "Heredity"),
                    record("near", vec![1.0, 0.1], "Electricity"),
                    record("mid", vec![1.0, 1.0], "Electricity"),
                ],
            )
            .await
            .unwrap();

        let matches = index.query(query(vec![1.0, 0.0], 2, None)).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn applies_metadata_filter() {
        let index = InMemoryIndex::new();
        index
            .upsert(
                "ns",
                vec![
                    record("a", vec![1.0, 0.0], "Heredity"),
                    record("b", vec![1.0, 0.0], "Electricity"),
                ],
            )
            .await
            .unwrap();

        let filter = MetadataFilter::new().any_of("chapter", ["Heredity"]);
        let matches = index
            .query(query(vec![1.0, 0.0], 10, Some(filter)))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a");
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = InMemoryIndex::new();
        index.upsert("ns", vec![record("a", vec![1.0], "Heredity")]).await.unwrap();
        index.upsert("ns", vec![record("a", vec![0.5], "Electricity")]).await.unwrap();

        assert_eq!(index.len("ns").await, 1);
        let stored = index.get("ns", "a").await.unwrap();
        assert_eq!(stored.metadata["chapter"], "Electricity");
    }

    #[tokio::test]
    async fn unknown_namespace_is_empty() {
        let index = InMemoryIndex::new();
        index.upsert("other", vec![record("a", vec![1.0], "Heredity")]).await.unwrap();
        let matches = index.query(query(vec![1.0], 5, None)).await.unwrap();
        assert!(matches.is_empty());
    }
}

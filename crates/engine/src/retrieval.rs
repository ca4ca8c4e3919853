//! Embedding and retrieval client.
//!
//! Turns a free-text query into a vector with the provider's embedding
//! endpoint, then asks the vector index for the nearest reference questions.

use std::sync::Arc;

use paperforge_config::DEFAULT_NAMESPACE;
use paperforge_core::error::PaperError;
use paperforge_core::index::{IndexQuery, MetadataFilter, RetrievalMatch, VectorIndex};
use paperforge_core::paper::PaperRequest;
use paperforge_core::provider::{EmbeddingRequest, Provider};
use tracing::{debug, warn};

use crate::snippet::format_matches;
use crate::syllabus::SyllabusRegistry;

pub const DEFAULT_TOP_K: usize = 12;

/// Per-query options for the vector index.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub namespace: String,
    pub top_k: usize,
    pub filter: Option<MetadataFilter>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.into(),
            top_k: DEFAULT_TOP_K,
            filter: None,
        }
    }
}

/// Raw matches plus their formatted, non-empty snippets.
#[derive(Debug, Clone, Default)]
pub struct Retrieved {
    pub matches: Vec<RetrievalMatch>,
    pub snippets: Vec<String>,
}

/// Embeds queries and searches the reference index.
pub struct Retriever {
    provider: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
    embedding_model: String,
    namespace: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        provider: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            index,
            embedding_model: embedding_model.into(),
            namespace: DEFAULT_NAMESPACE.into(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the namespace; blank values keep the default.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        if !namespace.trim().is_empty() {
            self.namespace = namespace.trim().to_string();
        }
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Embed a single query text.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, PaperError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            inputs: vec![text.to_string()],
        };

        let response = self.provider.embed(request).await.map_err(|e| {
            warn!(provider = %self.provider.name(), error = %e, "Query embedding failed");
            PaperError::Embedding(e.to_string())
        })?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| PaperError::Embedding("provider returned no embedding".into()))
    }

    /// Query the index. Matches come back in the store's order.
    pub async fn query_index(
        &self,
        vector: Vec<f32>,
        options: QueryOptions,
    ) -> Result<Vec<RetrievalMatch>, PaperError> {
        let namespace = if options.namespace.trim().is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            options.namespace
        };

        let query = IndexQuery {
            namespace,
            vector,
            top_k: options.top_k.max(1),
            filter: options.filter,
        };

        self.index.query(query).await.map_err(|e| {
            warn!(index = %self.index.name(), error = %e, "Index query failed");
            PaperError::Retrieval(e.to_string())
        })
    }

    /// Embed, query, and format.
    pub async fn retrieve(
        &self,
        query: &str,
        filter: Option<MetadataFilter>,
    ) -> Result<Retrieved, PaperError> {
        let vector = self.embed_query(query).await?;
        let matches = self
            .query_index(
                vector,
                QueryOptions {
                    namespace: self.namespace.clone(),
                    top_k: self.top_k,
                    filter,
                },
            )
            .await?;
        let snippets = format_matches(&matches);

        debug!(
            matches = matches.len(),
            snippets = snippets.len(),
            "Retrieved reference questions"
        );

        Ok(Retrieved { matches, snippets })
    }
}

/// Scope filter for a validated request.
///
/// Always pins subject and class level. Adds a chapter clause only when the
/// request selects a strict, non-empty subset of the registry.
pub fn build_filter(request: &PaperRequest, registry: &SyllabusRegistry) -> MetadataFilter {
    let filter = MetadataFilter::new()
        .eq("subject", request.subject.as_str())
        .eq("classLevel", request.class_level);

    if !request.chapters.is_empty() && request.chapters.len() < registry.len() {
        filter.any_of("chapter", request.chapters.iter().map(String::as_str))
    } else {
        filter
    }
}

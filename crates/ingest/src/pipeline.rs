//! Batch embed-and-upsert pipeline.

use std::sync::Arc;

use paperforge_core::index::{VectorIndex, VectorRecord};
use paperforge_core::provider::{EmbeddingRequest, Provider};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::IngestError;
use crate::item::prepare_item;

pub const DEFAULT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub namespace: String,
    pub batch_size: usize,
    pub embedding_model: String,
    /// Embed every batch but skip the upsert
    pub dry_run: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            namespace: "class10-science".into(),
            batch_size: DEFAULT_BATCH_SIZE,
            embedding_model: "text-embedding-3-small".into(),
            dry_run: false,
        }
    }
}

/// Counts from a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total: usize,
    pub embedded: usize,
    pub upserted: usize,
    pub skipped: usize,
    pub batches: usize,
}

pub struct Ingestor {
    provider: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
}

impl Ingestor {
    pub fn new(provider: Arc<dyn Provider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { provider, index }
    }

    /// Embed and upsert all items in order. The first failure aborts the run.
    pub async fn run(
        &self,
        items: &[Map<String, Value>],
        options: &IngestOptions,
    ) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport {
            total: items.len(),
            ..IngestReport::default()
        };
        let mut processed = 0;

        for batch in items.chunks(options.batch_size.max(1)) {
            processed += batch.len();

            let prepared: Vec<_> = batch.iter().filter_map(prepare_item).collect();
            report.skipped += batch.len() - prepared.len();
            if prepared.is_empty() {
                debug!(processed, "Batch has no embeddable items");
                continue;
            }

            let response = self
                .provider
                .embed(EmbeddingRequest {
                    model: options.embedding_model.clone(),
                    inputs: prepared.iter().map(|p| p.text.clone()).collect(),
                })
                .await?;

            if response.embeddings.len() < prepared.len() {
                return Err(IngestError::MissingEmbeddings {
                    expected: prepared.len(),
                    got: response.embeddings.len(),
                });
            }

            report.batches += 1;
            report.embedded += prepared.len();

            if options.dry_run {
                info!("Dry-run: generated embeddings for {processed}/{}", report.total);
                continue;
            }

            let records: Vec<VectorRecord> = prepared
                .into_iter()
                .zip(response.embeddings)
                .map(|(item, values)| VectorRecord {
                    id: item.id,
                    values,
                    metadata: item.metadata,
                })
                .collect();

            report.upserted += self.index.upsert(&options.namespace, records).await?;
            info!("Upserted {processed}/{}", report.total);
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use paperforge_core::error::ProviderError;
    use paperforge_core::provider::{EmbeddingResponse, ProviderRequest, ProviderResponse};
    use paperforge_index::InMemoryIndex;
    use serde_json::json;
    use std::sync::Mutex;

    /// Embeds every input as `[len, 1.0]`, optionally dropping the last row.
    struct CountingEmbedder {
        batches: Mutex<Vec<usize>>,
        short: bool,
    }

    impl CountingEmbedder {
        fn new() -> Self {
            Self { batches: Mutex::new(Vec::new()), short: false }
        }
    }

    #[async_trait]
    impl Provider for CountingEmbedder {
        fn name(&self) -> &str {
            "counting"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("embeddings only".into()))
        }

        async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
            self.batches.lock().unwrap().push(request.inputs.len());
            let mut embeddings: Vec<Vec<f32>> = request
                .inputs
                .iter()
                .map(|text| vec![text.len() as f32, 1.0])
                .collect();
            if self.short {
                embeddings.pop();
            }
            Ok(EmbeddingResponse { embeddings, model: request.model, usage: None })
        }
    }

    fn items(n: usize) -> Vec<Map<String, Value>> {
        (0..n)
            .map(|i| json!({ "id": format!("q{i}"), "chapter": "Heredity", "text": format!("Question {i}") }))
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn options(batch_size: usize, dry_run: bool) -> IngestOptions {
        IngestOptions { batch_size, dry_run, ..IngestOptions::default() }
    }

    #[tokio::test]
    async fn upserts_in_fixed_size_batches() {
        let provider = Arc::new(CountingEmbedder::new());
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(provider.clone(), index.clone());

        let report = ingestor.run(&items(5), &options(2, false)).await.unwrap();

        assert_eq!(*provider.batches.lock().unwrap(), vec![2, 2, 1]);
        assert_eq!(report, IngestReport { total: 5, embedded: 5, upserted: 5, skipped: 0, batches: 3 });
        assert_eq!(index.len("class10-science").await, 5);

        let stored = index.get("class10-science", "q3").await.unwrap();
        assert_eq!(stored.metadata["chapter"], "Heredity");
        assert_eq!(stored.metadata["subject"], "Science");
        assert_eq!(stored.metadata["classLevel"], 10);
    }

    #[tokio::test]
    async fn dry_run_embeds_without_upserting() {
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(Arc::new(CountingEmbedder::new()), index.clone());

        let report = ingestor.run(&items(3), &options(50, true)).await.unwrap();
        assert_eq!(report.embedded, 3);
        assert_eq!(report.upserted, 0);
        assert_eq!(index.len("class10-science").await, 0);
    }

    #[tokio::test]
    async fn items_without_text_are_skipped() {
        let mut input = items(2);
        input.push(json!({ "id": "blank", "subject": "Science" }).as_object().cloned().unwrap());
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(Arc::new(CountingEmbedder::new()), index.clone());

        let report = ingestor.run(&input, &options(1, false)).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.batches, 2);
        assert!(index.get("class10-science", "blank").await.is_none());
    }

    #[tokio::test]
    async fn short_embedding_response_aborts() {
        let provider = Arc::new(CountingEmbedder { batches: Mutex::new(Vec::new()), short: true });
        let index = Arc::new(InMemoryIndex::new());
        let ingestor = Ingestor::new(provider, index.clone());

        let err = ingestor.run(&items(3), &options(10, false)).await.unwrap_err();
        assert!(matches!(err, IngestError::MissingEmbeddings { expected: 3, got: 2 }));
        assert_eq!(index.len("class10-science").await, 0);
    }

    #[tokio::test]
    async fn zero_batch_size_is_treated_as_one() {
        let provider = Arc::new(CountingEmbedder::new());
        let ingestor = Ingestor::new(provider.clone(), Arc::new(InMemoryIndex::new()));
        ingestor.run(&items(2), &options(0, true)).await.unwrap();
        assert_eq!(*provider.batches.lock().unwrap(), vec![1, 1]);
    }
}

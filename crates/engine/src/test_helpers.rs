//! Shared test helpers for pipeline tests.

use async_trait::async_trait;
use paperforge_core::error::{IndexError, ProviderError};
use paperforge_core::index::{IndexQuery, RetrievalMatch, VectorIndex, VectorRecord};
use paperforge_core::message::Message;
use paperforge_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage,
};
use paperforge_index::InMemoryIndex;
use serde_json::json;
use std::sync::Mutex;

pub const NAMESPACE: &str = "class10-science";

/// A provider with a scripted completion and a fixed embedding.
///
/// Records every request it receives.
pub struct MockProvider {
    completion: String,
    embedding: Vec<f32>,
    fail_embeddings: bool,
    fail_completions: bool,
    embedded: Mutex<Vec<String>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(completion: &str) -> Self {
        Self {
            completion: completion.into(),
            embedding: vec![1.0, 0.0, 0.0],
            fail_embeddings: false,
            fail_completions: false,
            embedded: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn failing_embeddings(mut self) -> Self {
        self.fail_embeddings = true;
        self
    }

    pub fn failing_completions(mut self) -> Self {
        self.fail_completions = true;
        self
    }

    pub fn embedded_inputs(&self) -> Vec<String> {
        self.embedded.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_completions {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "upstream exploded".into(),
            });
        }

        Ok(ProviderResponse {
            message: Message::assistant(&self.completion),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: request.model,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.embedded.lock().unwrap().extend(request.inputs.iter().cloned());
        if self.fail_embeddings {
            return Err(ProviderError::Network("connection refused".into()));
        }

        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|_| self.embedding.clone()).collect(),
            model: request.model,
            usage: None,
        })
    }
}

/// Wraps an index and remembers the last query it saw.
pub struct RecordingIndex<I> {
    inner: I,
    last: Mutex<Option<IndexQuery>>,
}

impl<I> RecordingIndex<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    pub fn last_query(&self) -> Option<IndexQuery> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl<I: VectorIndex> VectorIndex for RecordingIndex<I> {
    fn name(&self) -> &str {
        "recording"
    }

    async fn query(&self, query: IndexQuery) -> Result<Vec<RetrievalMatch>, IndexError> {
        *self.last.lock().unwrap() = Some(query.clone());
        self.inner.query(query).await
    }

    async fn upsert(&self, namespace: &str, records: Vec<VectorRecord>) -> Result<usize, IndexError> {
        self.inner.upsert(namespace, records).await
    }
}

/// An index whose every call fails.
pub struct FailingIndex;

#[async_trait]
impl VectorIndex for FailingIndex {
    fn name(&self) -> &str {
        "failing"
    }

    async fn query(&self, _query: IndexQuery) -> Result<Vec<RetrievalMatch>, IndexError> {
        Err(IndexError::Api {
            status_code: 503,
            message: "index unavailable".into(),
        })
    }

    async fn upsert(&self, _namespace: &str, _records: Vec<VectorRecord>) -> Result<usize, IndexError> {
        Err(IndexError::Network("index unavailable".into()))
    }
}

fn record(id: &str, values: Vec<f32>, metadata: serde_json::Value) -> VectorRecord {
    VectorRecord {
        id: id.into(),
        values,
        metadata: metadata.as_object().cloned().unwrap(),
    }
}

/// An in-memory index with a handful of past-paper questions.
pub async fn seeded_index() -> InMemoryIndex {
    let index = InMemoryIndex::new();
    index
        .upsert(
            NAMESPACE,
            vec![
                record(
                    "pyq-acid-1",
                    vec![1.0, 0.0, 0.0],
                    json!({
                        "subject": "Science", "classLevel": 10, "year": 2023,
                        "chapter": "Acids, Bases and Salts", "marks": 3,
                        "text": "Why does dry HCl gas not change the colour of dry litmus paper?"
                    }),
                ),
                record(
                    "pyq-acid-2",
                    vec![0.9, 0.1, 0.0],
                    json!({
                        "subject": "Science", "classLevel": 10, "year": 2020,
                        "chapter": "Acids, Bases and Salts", "marks": 2,
                        "question": "What is the pH of pure water?"
                    }),
                ),
                record(
                    "pyq-heredity-1",
                    vec![0.0, 1.0, 0.0],
                    json!({
                        "subject": "Science", "classLevel": 10, "year": 2019,
                        "chapter": "Heredity", "topics": ["Mendel's experiments"],
                        "text": "Explain the law of independent assortment."
                    }),
                ),
                record(
                    "pyq-electricity-no-body",
                    vec![0.5, 0.5, 0.0],
                    json!({ "subject": "Science", "classLevel": 10, "chapter": "Electricity" }),
                ),
                record(
                    "pyq-maths",
                    vec![1.0, 0.0, 0.0],
                    json!({ "subject": "Mathematics", "classLevel": 10, "text": "Prove that root 2 is irrational." }),
                ),
            ],
        )
        .await
        .unwrap();
    index
}

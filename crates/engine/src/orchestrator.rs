//! Paper generation pipeline.
//!
//! # Flow
//!
//! 1. Validate and canonicalize the raw request
//! 2. Build the retrieval query and scope filter
//! 3. Embed the query and fetch reference questions
//! 4. Format snippets and compose the prompt
//! 5. Call the model once
//! 6. Reject blank output, return the trimmed paper
//!
//! Any stage failure aborts the run. There are no retries and no partial
//! results.

use std::sync::Arc;

use paperforge_config::{AppConfig, DEFAULT_NAMESPACE};
use paperforge_core::error::PaperError;
use paperforge_core::index::{MetadataFilter, VectorIndex};
use paperforge_core::paper::{GenerationMeta, GenerationResult, PaperRequest};
use paperforge_core::provider::{Provider, ProviderRequest};
use tracing::{debug, info, warn};

use crate::prompt::{ComposedPrompt, DEFAULT_MAX_SNIPPETS, PromptInput, compose};
use crate::request::{RawPaperRequest, validate};
use crate::retrieval::{DEFAULT_TOP_K, Retrieved, Retriever, build_filter};
use crate::syllabus::SyllabusRegistry;

/// Sampling temperature of the paper completion. Not configurable.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Model and retrieval settings for the pipeline.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub model: String,
    pub embedding_model: String,
    pub max_tokens: Option<u32>,
    pub namespace: String,
    pub top_k: usize,
    pub max_snippets: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".into(),
            embedding_model: "text-embedding-3-small".into(),
            max_tokens: None,
            namespace: DEFAULT_NAMESPACE.into(),
            top_k: DEFAULT_TOP_K,
            max_snippets: DEFAULT_MAX_SNIPPETS,
        }
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.openai.model.clone(),
            embedding_model: config.openai.embedding_model.clone(),
            max_tokens: config.generation.max_tokens,
            namespace: config.pinecone.namespace.clone(),
            top_k: config.retrieval.top_k,
            max_snippets: config.retrieval.max_snippets,
        }
    }
}

/// Everything computed before the model call.
#[derive(Debug, Clone)]
pub struct PreparedPaper {
    pub request: PaperRequest,
    pub retrieval_query: String,
    pub filter: MetadataFilter,
    pub retrieved: Retrieved,
    pub prompt: ComposedPrompt,
}

/// Generates question papers from raw requests.
pub struct PaperGenerator {
    registry: Arc<SyllabusRegistry>,
    provider: Arc<dyn Provider>,
    retriever: Retriever,
    settings: GeneratorSettings,
}

impl PaperGenerator {
    pub fn new(
        registry: Arc<SyllabusRegistry>,
        provider: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        settings: GeneratorSettings,
    ) -> Self {
        let retriever = Retriever::new(provider.clone(), index, settings.embedding_model.clone())
            .with_namespace(settings.namespace.clone())
            .with_top_k(settings.top_k);

        Self {
            registry,
            provider,
            retriever,
            settings,
        }
    }

    pub fn registry(&self) -> &SyllabusRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Run every stage up to and including prompt composition.
    pub async fn prepare(&self, raw: &RawPaperRequest) -> Result<PreparedPaper, PaperError> {
        let request = validate(raw, &self.registry)?;
        info!(
            chapters = request.chapters.len(),
            difficulty = %request.difficulty,
            sections = request.sections.len(),
            "Paper request accepted"
        );

        let retrieval_query = build_retrieval_query(&request);
        let filter = build_filter(&request, &self.registry);
        let retrieved = self
            .retriever
            .retrieve(&retrieval_query, Some(filter.clone()))
            .await?;

        info!(
            matches = retrieved.matches.len(),
            snippets = retrieved.snippets.len(),
            "Reference questions retrieved"
        );

        let prompt = compose(&PromptInput {
            request: &request,
            registry: &self.registry,
            snippets: &retrieved.snippets,
            max_snippets: self.settings.max_snippets,
        });

        Ok(PreparedPaper {
            request,
            retrieval_query,
            filter,
            retrieved,
            prompt,
        })
    }

    /// Run the full pipeline.
    pub async fn generate(&self, raw: &RawPaperRequest) -> Result<GenerationResult, PaperError> {
        self.run(raw)
            .await
            .inspect_err(|e| warn!(stage = e.stage(), error = %e, "Paper generation failed"))
    }

    async fn run(&self, raw: &RawPaperRequest) -> Result<GenerationResult, PaperError> {
        let prepared = self.prepare(raw).await?;
        let retrieved_snippet_count = prepared.retrieved.snippets.len();

        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages: prepared.prompt.into_messages(),
            temperature: GENERATION_TEMPERATURE,
            max_tokens: self.settings.max_tokens,
        };

        debug!(model = %self.settings.model, provider = %self.provider.name(), "Requesting paper");

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| PaperError::Generation(e.to_string()))?;

        let paper_text = response.message.content.trim();
        if paper_text.is_empty() {
            return Err(PaperError::EmptyGeneration);
        }

        if let Some(usage) = &response.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Paper generated"
            );
        }

        Ok(GenerationResult {
            paper_text: paper_text.to_string(),
            meta: GenerationMeta {
                model_id: self.settings.model.clone(),
                retrieved_snippet_count,
            },
        })
    }
}

/// The free-text query used to find reference questions.
pub fn build_retrieval_query(request: &PaperRequest) -> String {
    let mut lines = vec![format!(
        "CBSE Class {} {} question paper",
        request.class_level, request.subject
    )];
    if !request.chapters.is_empty() {
        lines.push(format!("Chapters: {}", request.chapters.join(", ")));
    }
    lines.push(format!("Difficulty: {}", request.difficulty));
    if !request.custom_prompt.is_empty() {
        lines.push(format!("Custom: {}", request.custom_prompt));
    }
    lines.join("\n")
}

//! Error types for the PaperForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! `PaperError` is the pipeline-level taxonomy; each external collaborator
//! (LLM provider, vector index) has its own bounded context error.

use thiserror::Error;

/// The failure taxonomy of the paper generation pipeline.
///
/// Every stage returns one of these and the pipeline aborts on the first one.
/// The `Display` text is the human-readable reason surfaced to callers.
#[derive(Debug, Clone, Error)]
pub enum PaperError {
    /// Class level or subject outside the supported scope.
    #[error("{0}")]
    UnsupportedScope(String),

    /// One or more requested chapters are not in the syllabus.
    #[error("Unknown chapter(s): {}. Choose from: {}", .unknown.join(", "), .valid.join(", "))]
    UnknownChapter {
        unknown: Vec<String>,
        valid: Vec<String>,
    },

    /// The embedding call failed or returned no usable vector.
    #[error("Failed to create query embedding: {0}")]
    Embedding(String),

    /// The vector store query failed.
    #[error("Reference retrieval failed: {0}")]
    Retrieval(String),

    /// The completion call failed or was rejected upstream.
    #[error("Paper generation failed: {0}")]
    Generation(String),

    /// The model answered, but with blank content.
    #[error("Model returned an empty response.")]
    EmptyGeneration,
}

/// Coarse classification of a failure, used by the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// The caller must resubmit with different input.
    InvalidRequest,
    /// An upstream service failed or misbehaved.
    Upstream,
}

impl PaperError {
    pub fn status_class(&self) -> StatusClass {
        match self {
            PaperError::UnsupportedScope(_) | PaperError::UnknownChapter { .. } => {
                StatusClass::InvalidRequest
            }
            PaperError::Embedding(_)
            | PaperError::Retrieval(_)
            | PaperError::Generation(_)
            | PaperError::EmptyGeneration => StatusClass::Upstream,
        }
    }

    /// Short stage label for structured logs.
    pub fn stage(&self) -> &'static str {
        match self {
            PaperError::UnsupportedScope(_) | PaperError::UnknownChapter { .. } => "validate",
            PaperError::Embedding(_) => "embed",
            PaperError::Retrieval(_) => "retrieve",
            PaperError::Generation(_) => "generate",
            PaperError::EmptyGeneration => "verify",
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Vector index request failed: {message} (status: {status_code})")]
    Api { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),

    #[error("Vector index not configured: {0}")]
    NotConfigured(String),
}

//! Ingestion errors.

use paperforge_core::error::{IndexError, ProviderError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Input JSON must be an array of objects (or an object with items/data/questions/records).")]
    InvalidShape,

    #[error("No items found in the JSON file.")]
    Empty,

    #[error("Embedding request failed: {0}")]
    Embedding(#[from] ProviderError),

    #[error("Expected {expected} embeddings, got {got}")]
    MissingEmbeddings { expected: usize, got: usize },

    #[error("Upsert failed: {0}")]
    Upsert(#[from] IndexError),
}

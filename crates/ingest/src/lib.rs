//! # PaperForge Ingest
//!
//! Loads past-paper questions from a JSON file, embeds them in fixed-size
//! batches, and upserts them into the reference index with sanitized
//! metadata.

pub mod error;
pub mod item;
pub mod loader;
pub mod pipeline;

pub use error::IngestError;
pub use item::{PreparedItem, embedding_text, prepare_item, sanitize_metadata, stable_id};
pub use loader::{load_items, parse_items};
pub use pipeline::{DEFAULT_BATCH_SIZE, IngestOptions, IngestReport, Ingestor};

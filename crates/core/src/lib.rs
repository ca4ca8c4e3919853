//! # PaperForge Core
//!
//! Domain types, traits, and error definitions for the PaperForge question
//! paper generator. This crate has **zero framework dependencies**; it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (the LLM backend, the vector store) is a trait
//! here. Implementations live in their respective crates. This enables:
//! - Constructing clients once at startup and injecting them as `Arc<dyn _>`
//! - Deterministic testing with fakes implementing the same trait
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod index;
pub mod message;
pub mod paper;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{IndexError, PaperError, ProviderError, StatusClass};
pub use index::{IndexQuery, MetadataFilter, RetrievalMatch, VectorIndex, VectorRecord};
pub use message::{Message, Role};
pub use paper::{Difficulty, GenerationMeta, GenerationResult, PaperRequest, SectionSpec};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse, Usage};

//! Vector index backends for PaperForge.
//!
//! All backends implement the `paperforge_core::VectorIndex` trait:
//! - [`PineconeIndex`] talks to a Pinecone index over its REST data plane.
//! - [`InMemoryIndex`] keeps records in process; used by tests and local runs.

pub mod in_memory;
pub mod pinecone;
pub mod vector;

pub use in_memory::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use vector::cosine_similarity;

//! # PaperForge Engine
//!
//! The question paper pipeline: syllabus registry, request validation,
//! reference retrieval, snippet formatting, prompt composition, and the
//! orchestrator that chains them.
//!
//! External collaborators are injected as `Arc<dyn Provider>` and
//! `Arc<dyn VectorIndex>`; the engine never constructs clients itself.

pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod retrieval;
pub mod snippet;
pub mod syllabus;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use orchestrator::{
    GENERATION_TEMPERATURE, GeneratorSettings, PaperGenerator, PreparedPaper, build_retrieval_query,
};
pub use prompt::{ComposedPrompt, PromptInput, compose};
pub use request::{RawPaperRequest, canonicalize_chapters, validate};
pub use retrieval::{QueryOptions, Retrieved, Retriever, build_filter};
pub use snippet::{format_match, format_matches};
pub use syllabus::{SyllabusEntry, SyllabusError, SyllabusRegistry};

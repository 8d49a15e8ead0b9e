//! docqa-rag: document question-answering with retrieval-augmented generation
//!
//! This crate implements the RAG core behind a document Q&A system: documents
//! are split into overlapping word-window chunks, embedded into a vector
//! space, and indexed for exact nearest-neighbor search; questions are
//! answered by a single LLM completion grounded in the retrieved chunks, with
//! citations derived from the source documents.
//!
//! The serving layer (HTTP routing, upload handling, text extraction) is an
//! external collaborator; this crate exposes [`RagPipeline`] as the process-wide
//! service it drives.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::RagPipeline;
pub use types::{
    document::{ChunkRecord, DocumentRef, FileType},
    response::AnswerResult,
};

/// Re-export the index crate for convenience
pub use docqa_index;

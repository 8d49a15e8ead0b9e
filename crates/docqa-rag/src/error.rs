//! Error types for the RAG core

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the RAG pipeline.
///
/// All variants are recoverable at the caller boundary: the serving layer
/// maps them to client-facing failures, and none should take the process
/// down.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (e.g. chunk overlap >= chunk size)
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedding or completion backend could not be reached
    #[error("model backend unavailable: {0}")]
    ModelUnavailable(String),

    /// A question was asked before any content was indexed
    #[error("no documents have been indexed yet; upload and ingest documents first")]
    EmptyCorpus,

    /// Retrieval produced nothing usable for this question
    #[error("no relevant content found; try rephrasing or ingest more documents")]
    NoRelevantContent,

    /// The completion request failed (network, auth, quota, malformed response)
    #[error("answer generation failed: {0}")]
    Generation(String),

    /// Chunk store failure, including uniqueness violations
    #[error("storage error: {0}")]
    Storage(String),

    /// Vector index contract violation
    #[error(transparent)]
    Index(#[from] docqa_index::IndexError),
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

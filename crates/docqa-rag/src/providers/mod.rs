//! Provider abstractions for embeddings and answer generation
//!
//! Trait seams keep the pipeline independent of the concrete backends; the
//! bundled implementations talk to a local Ollama server.

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm, OllamaProvider};

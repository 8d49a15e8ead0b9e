//! Document ingestion: text chunking

mod chunker;

pub use chunker::TextChunker;

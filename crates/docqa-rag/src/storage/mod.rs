//! Persistent storage for documents and chunks

mod chunk_store;

pub use chunk_store::ChunkStore;

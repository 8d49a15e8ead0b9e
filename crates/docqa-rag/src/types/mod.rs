//! Core data types

pub mod document;
pub mod response;

pub use document::{ChunkRecord, DocumentRef, FileType};
pub use response::AnswerResult;

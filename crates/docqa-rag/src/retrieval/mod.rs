//! Retrieval: the in-memory corpus index and position resolution

mod corpus;

pub use corpus::{CorpusIndex, ResolvedHit};

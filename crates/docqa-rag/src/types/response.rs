//! Answer types returned to the serving collaborator

use serde::{Deserialize, Serialize};

/// Result of a question-answering request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Generated answer text
    pub answer: String,
    /// Deduplicated titles of the documents the retrieved chunks came from,
    /// in retrieval order
    pub citations: Vec<String>,
}

//! LLM provider trait for answer generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM-based answer generation.
///
/// `generate_answer` issues exactly one completion request; retry policy is
/// the caller's concern.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate an answer grounded in the given context
    async fn generate_answer(&self, question: &str, context: &str) -> Result<String>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// The model being used
    fn model(&self) -> &str;
}

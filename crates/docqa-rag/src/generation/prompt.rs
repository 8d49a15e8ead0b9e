//! Prompt templates for grounded question answering

/// Prompt builder for RAG completions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the context window from retrieved chunk texts, nearest first,
    /// separated by a blank line.
    pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
        chunks
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the question-answering prompt with a concise-answer and
    /// cite-sources instruction.
    pub fn build_qa_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Based on the following context, please answer the question. Always cite your sources.

Context:
{context}

Question: {question}

Please provide a clear and concise answer, citing the relevant sources from the context."#
        )
    }
}

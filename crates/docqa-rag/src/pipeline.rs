//! Process-wide RAG pipeline service
//!
//! One [`RagPipeline`] is constructed at startup (health checks, cold-start
//! rebuild) and shared across requests, typically inside an `Arc`. Model
//! clients, index, and chunk mapping live for the whole process; nothing is
//! reconstructed per request.

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::TextChunker;
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::retrieval::CorpusIndex;
use crate::storage::ChunkStore;
use crate::types::document::{ChunkRecord, DocumentRef};
use crate::types::response::AnswerResult;

/// Default number of chunks retrieved per question
pub const DEFAULT_TOP_K: usize = 3;

/// The RAG pipeline: ingestion, retrieval, and answer synthesis over one
/// shared corpus.
pub struct RagPipeline {
    chunker: TextChunker,
    store: ChunkStore,
    corpus: CorpusIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    /// Serializes persist + embed + append so concurrent ingestions cannot
    /// interleave their position assignments.
    ingest_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline")
            .field("embedder", &self.embedder.name())
            .field("llm", &self.llm.name())
            .finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Initialize the pipeline: validate configuration, verify both model
    /// backends, and rebuild the index from persisted chunks.
    ///
    /// Fails with [`Error::ModelUnavailable`] when either backend cannot be
    /// reached; this is fatal at startup and there is no partial operation.
    pub async fn new(
        config: &RagConfig,
        store: ChunkStore,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = TextChunker::from_config(&config.chunking)?;

        if !embedder.health_check().await? {
            return Err(Error::ModelUnavailable(format!(
                "embedding backend {} did not pass the startup health check",
                embedder.name()
            )));
        }
        if !llm.health_check().await? {
            return Err(Error::ModelUnavailable(format!(
                "completion backend {} did not pass the startup health check",
                llm.name()
            )));
        }

        let corpus = CorpusIndex::new(embedder.dimensions())?;

        let pipeline = Self {
            chunker,
            store,
            corpus,
            embedder,
            llm,
            ingest_lock: tokio::sync::Mutex::new(()),
        };
        let restored = pipeline.rebuild().await?;
        tracing::info!(
            restored,
            model = pipeline.llm.model(),
            "RAG pipeline initialized"
        );

        Ok(pipeline)
    }

    /// Rebuild index state from persisted chunks.
    ///
    /// Chunks are loaded in creation order and embedded in one batch, so
    /// index positions line up 1:1 with the loaded sequence. Returns the
    /// number of chunks restored.
    async fn rebuild(&self) -> Result<usize> {
        let chunks = self.store.load_all_chunks()?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<(Uuid, String)> = chunks
            .into_iter()
            .map(|c| (c.document_id, c.content))
            .collect();
        let count = entries.len();
        self.corpus.append(entries, &vectors)?;

        tracing::info!(chunks = count, "rebuilt corpus index from chunk store");
        Ok(count)
    }

    /// Ingest a document's extracted text: chunk, persist, embed, index.
    ///
    /// Not idempotent: ingesting the same document twice derives the same
    /// embedding keys, and the uniqueness constraint rejects the second
    /// batch. Returns the number of chunks created.
    pub async fn ingest(&self, document: &DocumentRef, raw_text: &str) -> Result<u32> {
        let _guard = self.ingest_lock.lock().await;

        let texts = self.chunker.chunk(raw_text);
        self.store.insert_document(document)?;
        if texts.is_empty() {
            tracing::warn!(document = %document.id, "document produced no chunks");
            return Ok(0);
        }

        let records: Vec<ChunkRecord> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| ChunkRecord::new(document.id, t.clone(), i as u32))
            .collect();
        self.store.insert_chunks(&records)?;

        let vectors = self.embedder.embed_batch(&texts).await?;
        let entries: Vec<(Uuid, String)> = records
            .into_iter()
            .map(|r| (r.document_id, r.content))
            .collect();
        let positions = self.corpus.append(entries, &vectors)?;

        tracing::info!(
            document = %document.id,
            chunks = texts.len(),
            first_position = positions.start,
            "document ingested"
        );
        Ok(texts.len() as u32)
    }

    /// Answer a question from the indexed corpus with `DEFAULT_TOP_K` chunks.
    pub async fn ask_default(&self, question: &str) -> Result<AnswerResult> {
        self.ask(question, DEFAULT_TOP_K).await
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Retrieves the `top_k` nearest chunks, grounds a single completion
    /// request in them, and cites the titles of the documents the retrieved
    /// chunks came from.
    pub async fn ask(&self, question: &str, top_k: usize) -> Result<AnswerResult> {
        if self.corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let query = self.embedder.embed(question).await?;
        let hits = self.corpus.search(&query, top_k)?;
        if hits.is_empty() {
            return Err(Error::NoRelevantContent);
        }

        let texts: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
        let context = PromptBuilder::build_context(&texts);

        let answer = self.llm.generate_answer(question, &context).await?;

        // Dedup citations by document, preserving retrieval order. Documents
        // deleted since retrieval are skipped.
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut citations = Vec::new();
        for hit in &hits {
            if seen.insert(hit.document_id) {
                if let Some(doc) = self.store.get_document(&hit.document_id)? {
                    citations.push(doc.title);
                }
            }
        }

        tracing::info!(
            retrieved = hits.len(),
            citations = citations.len(),
            "question answered"
        );
        Ok(AnswerResult { answer, citations })
    }

    /// Remove a document: cascade-delete its chunks from the store and
    /// tombstone its index positions. Returns the number of chunks removed
    /// from the store.
    pub async fn remove_document(&self, id: &Uuid) -> Result<usize> {
        let _guard = self.ingest_lock.lock().await;
        let deleted = self.store.delete_document(id)?;
        let invalidated = self.corpus.invalidate_document(id);
        tracing::info!(document = %id, deleted, invalidated, "document removed");
        Ok(deleted)
    }

    /// List all known documents
    pub fn documents(&self) -> Result<Vec<DocumentRef>> {
        self.store.list_documents()
    }

    /// Number of index positions ever assigned this process lifetime
    pub fn indexed_chunks(&self) -> usize {
        self.corpus.len()
    }
}

//! In-memory corpus index: vector index plus position-to-chunk mapping
//!
//! The flat index and the entry list live behind a single lock so a reader
//! sees either the pre- or post-append state, never a half-applied one.
//! Positions form one monotonically increasing sequence shared by the
//! cold-start rebuild and every later ingestion.

use std::ops::Range;

use parking_lot::RwLock;
use uuid::Uuid;

use docqa_index::FlatIndex;

use crate::error::{Error, Result};

/// One indexed chunk: position `i` in the index corresponds to entry `i`.
struct IndexEntry {
    document_id: Uuid,
    content: String,
    /// Cleared when the owning document is deleted; the flat index cannot
    /// drop vectors, so dead positions are skipped at resolution time until
    /// the next cold start rebuilds without them.
    alive: bool,
}

/// A search hit resolved to its chunk text and owning document
#[derive(Debug, Clone)]
pub struct ResolvedHit {
    /// Index position (internal correlation key)
    pub position: usize,
    /// Euclidean distance to the query
    pub distance: f32,
    /// Owning document ID
    pub document_id: Uuid,
    /// Chunk text content
    pub content: String,
}

struct CorpusState {
    index: FlatIndex,
    entries: Vec<IndexEntry>,
}

/// Process-lifetime corpus index shared across requests
pub struct CorpusIndex {
    state: RwLock<CorpusState>,
}

impl CorpusIndex {
    /// Create an empty corpus index for the given embedding dimension
    pub fn new(dimensions: usize) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(CorpusState {
                index: FlatIndex::new(dimensions)?,
                entries: Vec::new(),
            }),
        })
    }

    /// Number of positions ever assigned (tombstoned ones included)
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Whether anything has ever been indexed
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Append chunk entries and their vectors in one critical section.
    ///
    /// Entry `i` of this batch receives the position reported by the index,
    /// keeping the position space and the mapping aligned. Returns the
    /// assigned position range.
    pub fn append(&self, entries: Vec<(Uuid, String)>, vectors: &[Vec<f32>]) -> Result<Range<usize>> {
        if entries.len() != vectors.len() {
            return Err(Error::Storage(format!(
                "entry/vector count mismatch: {} entries, {} vectors",
                entries.len(),
                vectors.len()
            )));
        }

        let mut state = self.state.write();
        let positions = state.index.insert(vectors)?;
        state
            .entries
            .extend(entries.into_iter().map(|(document_id, content)| IndexEntry {
                document_id,
                content,
                alive: true,
            }));

        debug_assert_eq!(state.entries.len(), positions.end);
        tracing::debug!(
            start = positions.start,
            end = positions.end,
            "appended corpus entries"
        );
        Ok(positions)
    }

    /// Nearest-neighbor search resolved to chunks.
    ///
    /// Positions that cannot be resolved (tombstoned or out of range) are
    /// skipped rather than failing the search, so the caller may receive
    /// fewer than `k` hits.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ResolvedHit>> {
        let state = self.state.read();
        let neighbors = state.index.search(query, k)?;

        let hits = neighbors
            .into_iter()
            .filter_map(|n| {
                let entry = state.entries.get(n.position)?;
                if !entry.alive {
                    return None;
                }
                Some(ResolvedHit {
                    position: n.position,
                    distance: n.distance,
                    document_id: entry.document_id,
                    content: entry.content.clone(),
                })
            })
            .collect();

        Ok(hits)
    }

    /// Tombstone every position owned by the given document.
    ///
    /// Returns the number of positions invalidated.
    pub fn invalidate_document(&self, document_id: &Uuid) -> usize {
        let mut state = self.state.write();
        let mut invalidated = 0;
        for entry in &mut state.entries {
            if entry.alive && entry.document_id == *document_id {
                entry.alive = false;
                invalidated += 1;
            }
        }
        if invalidated > 0 {
            tracing::debug!(%document_id, invalidated, "tombstoned corpus entries");
        }
        invalidated
    }
}

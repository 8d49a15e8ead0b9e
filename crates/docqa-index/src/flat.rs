//! Flat brute-force index over contiguous vector storage

use std::cmp::Ordering;
use std::ops::Range;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::distance::squared_euclidean;
use crate::error::{IndexError, Result};

/// A single search hit: the position assigned at insertion time and the
/// Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Insertion-order position of the matched vector
    pub position: usize,
    /// Euclidean distance to the query (lower is closer)
    pub distance: f32,
}

/// Exact nearest-neighbor index backed by a flat, row-major vector buffer.
///
/// `insert` is the only mutator; `search` takes `&self` and never changes
/// index state. Synchronization across threads is the caller's concern.
pub struct FlatIndex {
    dimensions: usize,
    /// Row-major storage: vector `i` occupies `[i * dimensions, (i + 1) * dimensions)`
    data: Vec<f32>,
}

impl FlatIndex {
    /// Create an empty index for vectors of the given dimension.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(IndexError::ZeroDimension);
        }
        Ok(Self {
            dimensions,
            data: Vec::new(),
        })
    }

    /// Vector dimension this index was created with.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of vectors stored.
    pub fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append vectors, assigning each the next sequential position.
    ///
    /// Returns the range of positions assigned to this batch. Positions grow
    /// monotonically across the life of the index and are never reused.
    /// Fails without modifying the index if any vector has the wrong
    /// dimension.
    pub fn insert(&mut self, vectors: &[Vec<f32>]) -> Result<Range<usize>> {
        for v in vectors {
            if v.len() != self.dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: v.len(),
                });
            }
        }

        let start = self.len();
        self.data.reserve(vectors.len() * self.dimensions);
        for v in vectors {
            self.data.extend_from_slice(v);
        }

        let range = start..self.len();
        tracing::debug!(inserted = vectors.len(), total = range.end, "index insert");
        Ok(range)
    }

    /// Exact k-nearest-neighbor search by Euclidean distance.
    ///
    /// Results are sorted ascending by distance; equal distances are broken
    /// by insertion order (earlier position wins). Returns fewer than `k`
    /// hits when the index holds fewer than `k` vectors, and an empty vector
    /// when the index is empty.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .data
            .par_chunks(self.dimensions)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_euclidean(query, row),
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.position.cmp(&b.position))
        });
        hits.truncate(k);

        for hit in &mut hits {
            hit.distance = hit.distance.sqrt();
        }

        Ok(hits)
    }
}

//! Overlapping word-window chunker

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};

/// Splits raw text into overlapping windows of whitespace-delimited words.
///
/// A window of `size` words advances by `size - overlap` words per step, so
/// consecutive chunks share `overlap` words. The final window may be shorter
/// than `size`. Chunking is deterministic: identical input yields identical
/// chunk boundaries.
pub struct TextChunker {
    /// Window size in words
    size: usize,
    /// Overlap between consecutive windows in words
    overlap: usize,
}

impl TextChunker {
    /// Create a chunker, rejecting parameters that would not advance the window.
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::Config("chunk size must be non-zero".to_string()));
        }
        if overlap >= size {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, size
            )));
        }
        Ok(Self { size, overlap })
    }

    /// Create a chunker from a [`ChunkingConfig`] section.
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into chunks. Empty text yields no chunks.
    ///
    /// A window is emitted only while it contributes words beyond the
    /// previous window's overlap, so for `n` words the chunk count is
    /// `ceil(max(n - overlap, 1) / (size - overlap))`.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.size - self.overlap;
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.size).min(words.len());
            chunks.push(words[start..end].join(" "));
            start += step;
            if start + self.overlap >= words.len() {
                break;
            }
        }
        chunks
    }
}

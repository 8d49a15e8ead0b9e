//! Index error types

use thiserror::Error;

/// Result alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised by index operations
#[derive(Debug, Error)]
pub enum IndexError {
    /// A vector's dimension does not match the index dimension
    #[error("dimension mismatch: index is {expected}-dimensional, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The index was constructed with a zero dimension
    #[error("index dimension must be non-zero")]
    ZeroDimension,
}

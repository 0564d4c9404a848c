//! Error types for the dataset model.

use thiserror::Error;

/// Errors that can occur while constructing or indexing datasets.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Buffer length does not match the number of elements implied by the shape.
    #[error("buffer holds {actual} elements but shape implies {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Number of axes disagrees between two related objects.
    #[error("expected rank {expected}, got rank {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// A dimension name is used with two different sizes.
    #[error("dimension {dim:?} has size {existing} but variable declares {conflicting}")]
    DimensionMismatch {
        dim: String,
        existing: usize,
        conflicting: usize,
    },

    /// A chunk grid declaration is invalid for the backing array.
    #[error("invalid chunk grid: {0}")]
    InvalidChunks(String),

    /// A block index lies outside the chunk grid.
    #[error("block index {index:?} is outside chunk grid {grid:?}")]
    BlockOutOfBounds { index: Vec<usize>, grid: Vec<usize> },

    /// A sub-block request exceeds the array bounds.
    #[error("sub-block out of bounds: {0}")]
    OutOfBounds(String),
}

/// Result type for dataset model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

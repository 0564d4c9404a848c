//! Error types for metadata derivation and chunk serving.

use dataset_model::ModelError;
use thiserror::Error;

/// Errors raised while deriving store metadata or serving chunks.
///
/// Every variant is a local, data-dependent failure; none are transient.
/// The HTTP boundary maps each variant to a status code.
#[derive(Error, Debug)]
pub enum ZarrError {
    /// Declared encoding chunk shape disagrees with the backing array.
    #[error(
        "variable {variable:?}: encoding chunks {specified:?} do not match backing chunks {inferred:?}"
    )]
    ChunkMismatch {
        variable: String,
        specified: Vec<usize>,
        inferred: Vec<usize>,
    },

    /// The backing array's chunk grid cannot be described by a single
    /// uniform chunk shape.
    #[error("variable {variable:?}: non-uniform chunk grid {chunks:?}")]
    NonUniformChunks {
        variable: String,
        chunks: Vec<Vec<usize>>,
    },

    /// Malformed chunk key, or a key addressing a block that does not exist.
    #[error("invalid chunk key {key:?}{}", .expected.as_ref().map(|e| format!(", expected {e:?}")).unwrap_or_default())]
    InvalidChunkKey {
        key: String,
        /// The only valid key, when there is exactly one.
        expected: Option<String>,
    },

    /// Object-dtype arrays have no byte representation to encode.
    #[error("cannot encode object array without an object codec")]
    UnencodableObjectArray,

    /// The requested variable does not exist in the dataset.
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),

    /// The requested key names a group path that does not exist.
    #[error("no such group path {0:?}")]
    UnknownGroupPath(String),

    /// A declared codec configuration names no known implementation.
    #[error("unknown codec id {0:?}")]
    UnknownCodec(String),

    /// A codec failed while encoding or decoding.
    #[error("codec error: {0}")]
    Codec(String),

    /// Backing array error surfaced during metadata or chunk derivation.
    #[error("array error: {0}")]
    Model(#[from] ModelError),

    /// Wire serialization error.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<std::io::Error> for ZarrError {
    fn from(err: std::io::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, ZarrError>;

//! In-memory N-dimensional dataset abstraction.
//!
//! This crate models the data that the serving layer publishes: datasets of
//! named variables, each backed by either a dense in-memory buffer or a
//! chunked array with a block grid. It knows nothing about wire formats;
//! the `zarr-store` crate derives store-compatible metadata from these
//! types.
//!
//! - [`NdBuffer`]: flat row-major byte buffer with dtype and shape
//! - [`ChunkedArray`]: per-axis chunk grid over a backing buffer
//! - [`ArrayData`]: closed variant, in-memory vs. chunked backing
//! - [`Variable`] / [`Encoding`]: named arrays with storage declarations
//! - [`Dataset`]: ordered variable collection with global attributes

pub mod array;
pub mod attrs;
pub mod dataset;
pub mod dtype;
pub mod error;
pub mod variable;

pub use array::{ArrayData, ChunkedArray, NdBuffer};
pub use attrs::{AttrValue, Attrs};
pub use dataset::{Dataset, DATASET_ID_ATTR_KEY};
pub use dtype::{DType, DTypeKind, Element};
pub use error::{ModelError, Result};
pub use variable::{codec_config, CodecConfig, CompressorSpec, Encoding, Variable};

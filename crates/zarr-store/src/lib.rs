//! Zarr-v2-compatible metadata consolidation and chunk serving over
//! in-memory datasets.
//!
//! This crate derives the documents and chunk payloads a Zarr reader
//! expects from a [`dataset_model::Dataset`], without any store on disk:
//!
//! ```text
//! GET .zmetadata                 GET {var}/{chunk_key}
//!      │                               │
//!      ▼                               ▼
//! get_zmetadata(ds, cache)       get_zvariables(ds, cache)
//!      │  cache miss                   │
//!      ▼                               ▼
//! create_zmetadata(ds)           get_data_chunk(data, key, chunks)
//!      │  per variable                 │  edge chunks zero-padded
//!      ▼                               ▼
//! extract_zarray / zattrs        encode_chunk(chunk, filters, compressor)
//!      │                               │
//!      ▼                               ▼
//! pinned cache entry             cached under {dataset_id}/{var}/{key}
//!                                (cost = compute seconds, size = bytes)
//! ```
//!
//! The cache and dataset lookups are explicit parameters of every entry
//! point; this crate owns no global state and is synchronous throughout.
//! Concurrency (and the translation of [`ZarrError`] kinds into status
//! codes) belongs to the serving layer.

pub mod cache;
pub mod chunks;
pub mod codec;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod types;
pub mod variables;
pub mod zarray;

pub use cache::{
    cache_key, shared_cache, Cache, CacheStats, CacheValue, CostTimer, SharedCache,
    PERMANENT_COST,
};
pub use chunks::{get_data_chunk, parse_chunk_key};
pub use codec::{decode_chunk, default_compressor, encode_chunk, Compressor, Filter};
pub use encoding::{encode_attr_value, encode_fill_value};
pub use error::{Result, ZarrError};
pub use metadata::{create_zmetadata, get_zmetadata, jsonify_zmetadata};
pub use types::{
    Order, ZArray, ZAttrs, ZEntry, ZGroup, ZMetadata, ARRAY_META_KEY, ATTRS_KEY,
    COORDINATES_KEY, DIMENSION_KEY, FILL_VALUE_KEY, GROUP_META_KEY, ZARR_CONSOLIDATED_FORMAT,
    ZARR_FORMAT, ZARR_METADATA_KEY,
};
pub use variables::{
    create_zvariables, encode_variable, get_zvariables, ZVariable, ZVariables, ZVARIABLES_KEY,
};
pub use zarray::{extract_variable_zattrs, extract_zarray};

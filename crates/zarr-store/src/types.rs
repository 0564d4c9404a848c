//! Wire document types for the Zarr v2 key-value layout.
//!
//! An example `.zarray` document:
//! ```json
//! {
//!     "compressor": {"id": "zlib", "level": 1},
//!     "filters": null,
//!     "chunks": [5, 5],
//!     "dtype": "<f8",
//!     "fill_value": "NaN",
//!     "order": "C",
//!     "shape": [10, 10],
//!     "zarr_format": 2,
//!     "dimension_separator": "."
//! }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::codec::{Compressor, Filter};

/// Storage format version served by this crate.
pub const ZARR_FORMAT: u64 = 2;
/// Consolidated-metadata format version.
pub const ZARR_CONSOLIDATED_FORMAT: u64 = 1;

/// Store key of the consolidated metadata document.
pub const ZARR_METADATA_KEY: &str = ".zmetadata";
/// Store key suffix of array descriptors.
pub const ARRAY_META_KEY: &str = ".zarray";
/// Store key suffix of attribute documents.
pub const ATTRS_KEY: &str = ".zattrs";
/// Store key of the group descriptor.
pub const GROUP_META_KEY: &str = ".zgroup";

/// Synthetic attribute naming a variable's dimensions, in order.
pub const DIMENSION_KEY: &str = "_ARRAY_DIMENSIONS";
/// Attribute key holding a variable's fill value. Extracted into the array
/// descriptor and never present in attribute documents.
pub const FILL_VALUE_KEY: &str = "_FillValue";
/// Synthesized attribute listing non-dimension coordinate names.
pub const COORDINATES_KEY: &str = "coordinates";

/// Group descriptor (`.zgroup`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZGroup {
    pub zarr_format: u64,
}

impl Default for ZGroup {
    fn default() -> Self {
        Self {
            zarr_format: ZARR_FORMAT,
        }
    }
}

/// Encoded attribute document (`.zattrs`), for the dataset or one variable.
pub type ZAttrs = serde_json::Map<String, Value>;

/// Memory layout of chunk bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Order {
    /// Row-major; the last dimension varies fastest.
    C,
    /// Column-major; the first dimension varies fastest.
    F,
}

/// Array descriptor (`.zarray`) for one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZArray {
    pub compressor: Option<Compressor>,
    pub filters: Option<Vec<Filter>>,
    pub chunks: Vec<usize>,
    pub dtype: String,
    pub fill_value: Value,
    pub order: Order,
    pub shape: Vec<usize>,
    pub zarr_format: u64,
    pub dimension_separator: String,
}

/// One entry of the consolidated metadata mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ZEntry {
    Group(ZGroup),
    Attrs(ZAttrs),
    Array(ZArray),
}

impl ZEntry {
    pub fn as_array(&self) -> Option<&ZArray> {
        match self {
            ZEntry::Array(zarray) => Some(zarray),
            _ => None,
        }
    }

    pub fn as_attrs(&self) -> Option<&ZAttrs> {
        match self {
            ZEntry::Attrs(zattrs) => Some(zattrs),
            _ => None,
        }
    }
}

/// Consolidated metadata document (`.zmetadata`): the group descriptor,
/// dataset attributes, and every variable's attribute/array descriptors in
/// one structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZMetadata {
    pub zarr_consolidated_format: u64,
    pub metadata: BTreeMap<String, ZEntry>,
}

impl ZMetadata {
    /// Look up one entry by its store key.
    pub fn entry(&self, key: &str) -> Option<&ZEntry> {
        self.metadata.get(key)
    }
}

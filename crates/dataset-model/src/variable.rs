//! Variables and their storage encoding declarations.

use serde_json::Value;

use crate::array::ArrayData;
use crate::attrs::{AttrValue, Attrs};
use crate::dtype::DType;
use crate::error::{ModelError, Result};

/// Plain-data codec configuration: a JSON object carrying an `"id"` key and
/// codec-specific parameters, e.g. `{"id": "zlib", "level": 1}`.
///
/// Configurations are data here; resolving them to codec implementations is
/// the serving layer's concern.
pub type CodecConfig = serde_json::Map<String, Value>;

/// Build a codec configuration from an id and parameter pairs.
pub fn codec_config(id: &str, params: &[(&str, Value)]) -> CodecConfig {
    let mut config = CodecConfig::new();
    config.insert("id".to_string(), Value::String(id.to_string()));
    for (key, value) in params {
        config.insert((*key).to_string(), value.clone());
    }
    config
}

/// Compressor declaration on a variable's encoding.
///
/// Distinguishes "nothing declared" (fall back to the dataset-wide default)
/// from "explicitly uncompressed".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CompressorSpec {
    /// No declaration; the default compressor applies.
    #[default]
    Inherit,
    /// Explicitly no compressor (identity encoding).
    Disabled,
    /// A specific codec configuration.
    Config(CodecConfig),
}

/// Storage encoding declared on a variable.
///
/// Every field is optional; unset fields fall back to properties of the
/// backing array or dataset-wide defaults when metadata is derived.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Encoding {
    /// Declared chunk shape. Must agree with the backing array's actual
    /// chunk grid; checked when metadata is built.
    pub chunks: Option<Vec<usize>>,
    /// Compressor declaration.
    pub compressor: CompressorSpec,
    /// Filter pipeline, applied in order before compression.
    pub filters: Option<Vec<CodecConfig>>,
    /// Fill value, taking precedence over a `_FillValue` attribute.
    pub fill_value: Option<AttrValue>,
    /// Coded dtype override for the stored representation.
    pub dtype: Option<DType>,
}

/// A named array with dimension names, attributes and a storage encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    dims: Vec<String>,
    data: ArrayData,
    attrs: Attrs,
    encoding: Encoding,
}

impl Variable {
    /// Create a variable, validating that the dimension list matches the
    /// array rank.
    pub fn new(dims: &[&str], data: ArrayData) -> Result<Self> {
        if dims.len() != data.ndim() {
            return Err(ModelError::RankMismatch {
                expected: data.ndim(),
                actual: dims.len(),
            });
        }
        Ok(Self {
            dims: dims.iter().map(|d| (*d).to_string()).collect(),
            data,
            attrs: Attrs::new(),
            encoding: Encoding::default(),
        })
    }

    /// Create a zero-rank variable.
    pub fn scalar(data: ArrayData) -> Result<Self> {
        Self::new(&[], data)
    }

    /// Attach an attribute (builder style).
    pub fn with_attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// Replace the encoding (builder style).
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn dtype(&self) -> &DType {
        self.data.dtype()
    }
}

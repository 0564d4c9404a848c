//! Filter/compressor pipeline for chunk payloads.
//!
//! Codecs are declared on variables as plain-data configurations
//! (`{"id": ..., ...}`) and resolved here to implementations. The enums
//! serialize directly to their configuration form, so array descriptors
//! embed codec objects and project to JSON without a separate walk.

use std::io::{Read, Write};

use bytes::Bytes;
use dataset_model::{CodecConfig, DType, NdBuffer};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ZarrError};

/// Compression codec applied to a chunk after filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "lowercase")]
pub enum Compressor {
    /// zlib/deflate at the given level (0-9).
    Zlib { level: u32 },
}

impl Compressor {
    /// Resolve a declared configuration to an implementation.
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        match config_id(config)? {
            "zlib" => {
                let level = config
                    .get("level")
                    .and_then(Value::as_u64)
                    .unwrap_or(1) as u32;
                if level > 9 {
                    return Err(ZarrError::Codec(format!("zlib level {level} out of range")));
                }
                Ok(Compressor::Zlib { level })
            }
            other => Err(ZarrError::UnknownCodec(other.to_string())),
        }
    }

    /// Compress a buffer.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compressor::Zlib { level } => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(*level));
                encoder.write_all(data)?;
                Ok(encoder.finish()?)
            }
        }
    }

    /// Decompress a buffer. Inverse of [`Compressor::encode`].
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Compressor::Zlib { .. } => {
                let mut out = Vec::new();
                ZlibDecoder::new(data).read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }
}

/// Reversible byte-level filter applied before compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "id", rename_all = "lowercase")]
pub enum Filter {
    /// Byte shuffle: groups the i-th byte of every element together,
    /// which helps the compressor on slowly-varying numeric data.
    Shuffle { elementsize: usize },
}

impl Filter {
    /// Resolve a declared configuration to an implementation.
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        match config_id(config)? {
            "shuffle" => {
                let elementsize = config
                    .get("elementsize")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as usize;
                if elementsize == 0 {
                    return Err(ZarrError::Codec(
                        "shuffle filter requires a nonzero elementsize".to_string(),
                    ));
                }
                Ok(Filter::Shuffle { elementsize })
            }
            other => Err(ZarrError::UnknownCodec(other.to_string())),
        }
    }

    /// Apply the filter.
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Filter::Shuffle { elementsize } => {
                let e = *elementsize;
                if data.len() % e != 0 {
                    return Err(ZarrError::Codec(format!(
                        "shuffle: buffer of {} bytes is not a multiple of elementsize {e}",
                        data.len()
                    )));
                }
                let count = data.len() / e;
                let mut out = Vec::with_capacity(data.len());
                for byte in 0..e {
                    for element in 0..count {
                        out.push(data[element * e + byte]);
                    }
                }
                Ok(out)
            }
        }
    }

    /// Reverse the filter. Inverse of [`Filter::encode`].
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Filter::Shuffle { elementsize } => {
                let e = *elementsize;
                if data.len() % e != 0 {
                    return Err(ZarrError::Codec(format!(
                        "shuffle: buffer of {} bytes is not a multiple of elementsize {e}",
                        data.len()
                    )));
                }
                let count = data.len() / e;
                let mut out = vec![0u8; data.len()];
                for byte in 0..e {
                    for element in 0..count {
                        out[element * e + byte] = data[byte * count + element];
                    }
                }
                Ok(out)
            }
        }
    }
}

fn config_id(config: &CodecConfig) -> Result<&str> {
    config
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ZarrError::UnknownCodec("<missing id>".to_string()))
}

/// The dataset-wide default compressor for variables that declare none.
pub fn default_compressor() -> Compressor {
    Compressor::Zlib { level: 1 }
}

/// Encode one chunk buffer into wire bytes: filters in declared order,
/// then the compressor. No filters and no compressor is the identity.
pub fn encode_chunk(
    chunk: &NdBuffer,
    filters: Option<&[Filter]>,
    compressor: Option<&Compressor>,
) -> Result<Bytes> {
    if *chunk.dtype() == DType::Object {
        return Err(ZarrError::UnencodableObjectArray);
    }

    let mut data = chunk.as_bytes().to_vec();
    if let Some(filters) = filters {
        for filter in filters {
            data = filter.encode(&data)?;
        }
    }
    if let Some(compressor) = compressor {
        data = compressor.encode(&data)?;
    }
    Ok(Bytes::from(data))
}

/// Decode wire bytes back to a raw chunk buffer: decompress, then reverse
/// the filters in reverse order. Provided for clients and round-trip tests.
pub fn decode_chunk(
    data: &[u8],
    filters: Option<&[Filter]>,
    compressor: Option<&Compressor>,
) -> Result<Vec<u8>> {
    let mut out = match compressor {
        Some(compressor) => compressor.decode(data)?,
        None => data.to_vec(),
    };
    if let Some(filters) = filters {
        for filter in filters.iter().rev() {
            out = filter.decode(&out)?;
        }
    }
    Ok(out)
}

//! Chunk-key parsing and sub-block extraction.
//!
//! Chunk keys are dotted tuples of grid coordinates (`"3.0.2"`). Chunked
//! arrays are indexed by block; fully in-memory arrays have exactly one
//! valid key, the all-zeros tuple for their rank. Short edge blocks are
//! padded to the declared chunk shape with a zero-initialized buffer; the
//! padding is never read by a correct client because the array shape
//! excludes it.

use dataset_model::{ArrayData, NdBuffer};
use tracing::debug;

use crate::error::{Result, ZarrError};

/// Parse a dotted chunk key into grid coordinates.
pub fn parse_chunk_key(key: &str) -> Result<Vec<usize>> {
    if key.is_empty() {
        return Err(ZarrError::InvalidChunkKey {
            key: key.to_string(),
            expected: None,
        });
    }
    key.split('.')
        .map(|token| {
            token.parse::<usize>().map_err(|_| ZarrError::InvalidChunkKey {
                key: key.to_string(),
                expected: None,
            })
        })
        .collect()
}

/// The single valid key for an array without block indexing. Rank zero
/// still uses a one-component key: scalars live under `"0"`.
fn expected_key(ndim: usize) -> String {
    if ndim == 0 {
        "0".to_string()
    } else {
        vec!["0"; ndim].join(".")
    }
}

/// Fetch one chunk's worth of data, shaped to `out_shape` even at grid
/// edges.
pub fn get_data_chunk(data: &ArrayData, key: &str, out_shape: &[usize]) -> Result<NdBuffer> {
    let indices = parse_chunk_key(key)?;

    let chunk = match data {
        ArrayData::Chunked(array) => {
            array
                .block(&indices)
                .map_err(|_| ZarrError::InvalidChunkKey {
                    key: key.to_string(),
                    expected: None,
                })?
        }
        ArrayData::InMemory(buffer) => {
            let ndim = buffer.ndim();
            let valid: Vec<usize> = vec![0; ndim.max(1)];
            if indices != valid {
                return Err(ZarrError::InvalidChunkKey {
                    key: key.to_string(),
                    expected: Some(expected_key(ndim)),
                });
            }
            buffer.clone()
        }
    };

    debug!(key, chunk_shape = ?chunk.shape(), out_shape = ?out_shape, "fetched chunk");

    if chunk.shape() == out_shape {
        return Ok(chunk);
    }

    // Short edge chunk: pad to the declared shape, data in the leading
    // sub-region.
    let mut padded = NdBuffer::zeros(chunk.dtype().clone(), out_shape.to_vec());
    padded.write_block(&vec![0; out_shape.len()], &chunk)?;
    Ok(padded)
}

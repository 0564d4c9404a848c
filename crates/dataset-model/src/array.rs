//! Flat N-dimensional buffers and chunked arrays.
//!
//! [`NdBuffer`] is a row-major (C order) byte buffer with a dtype and shape.
//! [`ChunkedArray`] overlays a per-axis chunk grid on a backing buffer and
//! materializes individual blocks on demand. [`ArrayData`] is the closed
//! variant the serving layer dispatches on: fully in-memory arrays support
//! only whole-array access, chunked arrays support block indexing.

use crate::dtype::{DType, Element};
use crate::error::{ModelError, Result};

/// A dense N-dimensional array stored as a flat little-endian byte buffer
/// in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct NdBuffer {
    dtype: DType,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl NdBuffer {
    /// Create a buffer from raw bytes, validating the length against the shape.
    pub fn new(dtype: DType, shape: Vec<usize>, data: Vec<u8>) -> Result<Self> {
        let elements: usize = shape.iter().product();
        let expected = elements * dtype.item_size();
        if data.len() != expected {
            return Err(ModelError::ShapeMismatch {
                expected: elements,
                actual: if dtype.item_size() == 0 {
                    0
                } else {
                    data.len() / dtype.item_size()
                },
            });
        }
        Ok(Self { dtype, shape, data })
    }

    /// Create a zero-initialized buffer.
    pub fn zeros(dtype: DType, shape: Vec<usize>) -> Self {
        let elements: usize = shape.iter().product();
        let data = vec![0u8; elements * dtype.item_size()];
        Self { dtype, shape, data }
    }

    /// Create a buffer from typed values.
    pub fn from_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> Result<Self> {
        let elements: usize = shape.iter().product();
        if values.len() != elements {
            return Err(ModelError::ShapeMismatch {
                expected: elements,
                actual: values.len(),
            });
        }
        let mut data = Vec::with_capacity(elements * T::DTYPE.item_size());
        for v in &values {
            v.extend_le(&mut data);
        }
        Ok(Self {
            dtype: T::DTYPE,
            shape,
            data,
        })
    }

    /// Create a zero-rank (scalar) buffer holding one value.
    pub fn scalar<T: Element>(value: T) -> Self {
        let mut data = Vec::with_capacity(T::DTYPE.item_size());
        value.extend_le(&mut data);
        Self {
            dtype: T::DTYPE,
            shape: Vec::new(),
            data,
        }
    }

    /// Create a datetime buffer from nanoseconds-since-epoch timestamps.
    pub fn from_datetimes(shape: Vec<usize>, timestamps_ns: Vec<i64>) -> Result<Self> {
        let mut buf = Self::from_vec(shape, timestamps_ns)?;
        buf.dtype = DType::DateTime64;
        Ok(buf)
    }

    /// Create an object-dtype buffer. Object arrays carry no byte
    /// representation; they exist so the encoding layer can reject them
    /// with a typed error instead of serializing garbage.
    pub fn object(shape: Vec<usize>) -> Self {
        Self {
            dtype: DType::Object,
            shape,
            data: Vec::new(),
        }
    }

    pub fn dtype(&self) -> &DType {
        &self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of elements.
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// Raw little-endian bytes in row-major order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Read the buffer back as typed values. The requested type must match
    /// the stored dtype's width; intended for tests and reassembly checks.
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        let item = T::DTYPE.item_size();
        self.data.chunks_exact(item).map(T::from_le).collect()
    }

    /// Reinterpret the buffer under a different dtype of the same width.
    /// Used for storage codings that change the coded type without touching
    /// bytes (e.g. datetimes stored as integers).
    pub fn with_dtype(mut self, dtype: DType) -> Result<NdBuffer> {
        if dtype.item_size() != self.dtype.item_size() {
            return Err(ModelError::ShapeMismatch {
                expected: self.num_elements() * dtype.item_size(),
                actual: self.data.len(),
            });
        }
        self.dtype = dtype;
        Ok(self)
    }

    /// Copy a rectangular sub-block, given its start corner and shape.
    ///
    /// Rows along the last axis are contiguous and copied as single runs.
    pub fn sub_block(&self, start: &[usize], shape: &[usize]) -> Result<NdBuffer> {
        let ndim = self.ndim();
        if start.len() != ndim || shape.len() != ndim {
            return Err(ModelError::RankMismatch {
                expected: ndim,
                actual: start.len().max(shape.len()),
            });
        }
        for axis in 0..ndim {
            if start[axis] + shape[axis] > self.shape[axis] {
                return Err(ModelError::OutOfBounds(format!(
                    "axis {axis}: {}..{} exceeds size {}",
                    start[axis],
                    start[axis] + shape[axis],
                    self.shape[axis]
                )));
            }
        }

        let item = self.dtype.item_size();
        let elements: usize = shape.iter().product();
        if ndim == 0 || elements == 0 || item == 0 {
            let data = if ndim == 0 { self.data.clone() } else { Vec::new() };
            return NdBuffer::new(self.dtype.clone(), shape.to_vec(), data);
        }

        // Element strides of the source buffer.
        let mut strides = vec![1usize; ndim];
        for axis in (0..ndim.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }

        let run = shape[ndim - 1] * item;
        let outer: usize = shape[..ndim - 1].iter().product();
        let mut out = Vec::with_capacity(elements * item);
        let mut index = vec![0usize; ndim - 1];

        for _ in 0..outer {
            let mut offset = start[ndim - 1];
            for (axis, &i) in index.iter().enumerate() {
                offset += (start[axis] + i) * strides[axis];
            }
            let byte = offset * item;
            out.extend_from_slice(&self.data[byte..byte + run]);

            for axis in (0..index.len()).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        NdBuffer::new(self.dtype.clone(), shape.to_vec(), out)
    }

    /// Write `block` into this buffer at the given start corner.
    ///
    /// Inverse of [`NdBuffer::sub_block`]; used to reassemble arrays from
    /// served chunks.
    pub fn write_block(&mut self, start: &[usize], block: &NdBuffer) -> Result<()> {
        let ndim = self.ndim();
        if start.len() != ndim || block.ndim() != ndim {
            return Err(ModelError::RankMismatch {
                expected: ndim,
                actual: block.ndim(),
            });
        }
        for axis in 0..ndim {
            if start[axis] + block.shape[axis] > self.shape[axis] {
                return Err(ModelError::OutOfBounds(format!(
                    "axis {axis}: {}..{} exceeds size {}",
                    start[axis],
                    start[axis] + block.shape[axis],
                    self.shape[axis]
                )));
            }
        }

        let item = self.dtype.item_size();
        if ndim == 0 {
            self.data.copy_from_slice(&block.data);
            return Ok(());
        }
        if block.num_elements() == 0 || item == 0 {
            return Ok(());
        }

        let mut strides = vec![1usize; ndim];
        for axis in (0..ndim.saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * self.shape[axis + 1];
        }

        let run = block.shape[ndim - 1] * item;
        let outer: usize = block.shape[..ndim - 1].iter().product();
        let mut index = vec![0usize; ndim - 1];

        for chunk_row in 0..outer {
            let mut offset = start[ndim - 1];
            for (axis, &i) in index.iter().enumerate() {
                offset += (start[axis] + i) * strides[axis];
            }
            let byte = offset * item;
            let src = chunk_row * run;
            self.data[byte..byte + run].copy_from_slice(&block.data[src..src + run]);

            for axis in (0..index.len()).rev() {
                index[axis] += 1;
                if index[axis] < block.shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }

        Ok(())
    }
}

/// An array split into a grid of chunks, dask-style: one list of chunk
/// sizes per axis. The grid need not be uniform; the metadata layer decides
/// whether a given grid is representable.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkedArray {
    buffer: NdBuffer,
    chunks: Vec<Vec<usize>>,
}

impl ChunkedArray {
    /// Split a buffer into a uniform grid with the given chunk shape.
    /// The final chunk along an axis may be short.
    pub fn split(buffer: NdBuffer, chunk_shape: &[usize]) -> Result<Self> {
        if chunk_shape.len() != buffer.ndim() {
            return Err(ModelError::RankMismatch {
                expected: buffer.ndim(),
                actual: chunk_shape.len(),
            });
        }
        let mut chunks = Vec::with_capacity(chunk_shape.len());
        for (axis, &c) in chunk_shape.iter().enumerate() {
            let size = buffer.shape()[axis];
            if c == 0 {
                return Err(ModelError::InvalidChunks(format!(
                    "chunk size 0 on axis {axis}"
                )));
            }
            let mut sizes = Vec::new();
            let mut remaining = size;
            while remaining > 0 {
                let take = c.min(remaining);
                sizes.push(take);
                remaining -= take;
            }
            if sizes.is_empty() {
                sizes.push(0);
            }
            chunks.push(sizes);
        }
        Ok(Self { buffer, chunks })
    }

    /// Overlay an explicit (possibly non-uniform) chunk grid on a buffer.
    pub fn with_chunks(buffer: NdBuffer, chunks: Vec<Vec<usize>>) -> Result<Self> {
        if chunks.len() != buffer.ndim() {
            return Err(ModelError::RankMismatch {
                expected: buffer.ndim(),
                actual: chunks.len(),
            });
        }
        for (axis, sizes) in chunks.iter().enumerate() {
            let total: usize = sizes.iter().sum();
            if total != buffer.shape()[axis] {
                return Err(ModelError::InvalidChunks(format!(
                    "axis {axis}: chunk sizes {sizes:?} sum to {total}, axis size is {}",
                    buffer.shape()[axis]
                )));
            }
            if sizes.iter().any(|&s| s == 0) && buffer.shape()[axis] != 0 {
                return Err(ModelError::InvalidChunks(format!(
                    "axis {axis}: zero-size chunk in {sizes:?}"
                )));
            }
        }
        Ok(Self { buffer, chunks })
    }

    /// The backing buffer.
    pub fn buffer(&self) -> &NdBuffer {
        &self.buffer
    }

    /// Per-axis chunk size lists.
    pub fn chunks(&self) -> &[Vec<usize>] {
        &self.chunks
    }

    /// The leading chunk size along each axis. For a uniform grid this is
    /// the declared chunk shape.
    pub fn chunk_size(&self) -> Vec<usize> {
        self.chunks
            .iter()
            .map(|sizes| sizes.first().copied().unwrap_or(0))
            .collect()
    }

    /// Number of blocks along each axis.
    pub fn grid_shape(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }

    /// Whether the grid is uniform: along every axis all non-final chunks
    /// share one size and the final chunk is no larger than it.
    pub fn is_uniform(&self) -> bool {
        self.chunks.iter().all(|sizes| {
            let non_final = &sizes[..sizes.len().saturating_sub(1)];
            let leading_uniform = non_final.windows(2).all(|w| w[0] == w[1]);
            let final_fits = match (sizes.first(), sizes.last()) {
                (Some(first), Some(last)) => last <= first,
                _ => true,
            };
            leading_uniform && final_fits
        })
    }

    pub fn shape(&self) -> &[usize] {
        self.buffer.shape()
    }

    pub fn dtype(&self) -> &DType {
        self.buffer.dtype()
    }

    /// Materialize one block of the grid.
    pub fn block(&self, index: &[usize]) -> Result<NdBuffer> {
        let grid = self.grid_shape();
        if index.len() != grid.len() {
            return Err(ModelError::BlockOutOfBounds {
                index: index.to_vec(),
                grid,
            });
        }
        for (axis, &i) in index.iter().enumerate() {
            if i >= grid[axis] {
                return Err(ModelError::BlockOutOfBounds {
                    index: index.to_vec(),
                    grid,
                });
            }
        }

        let mut start = Vec::with_capacity(index.len());
        let mut shape = Vec::with_capacity(index.len());
        for (axis, &i) in index.iter().enumerate() {
            start.push(self.chunks[axis][..i].iter().sum());
            shape.push(self.chunks[axis][i]);
        }
        self.buffer.sub_block(&start, &shape)
    }

    /// Redistribute the data into a uniform grid with the given chunk
    /// shape. Lossless: the backing data is unchanged.
    pub fn rechunk(&self, chunk_shape: &[usize]) -> Result<Self> {
        Self::split(self.buffer.clone(), chunk_shape)
    }
}

/// Backing storage of a variable: either one dense in-memory buffer or a
/// chunked array with a block grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    InMemory(NdBuffer),
    Chunked(ChunkedArray),
}

impl ArrayData {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayData::InMemory(buf) => buf.shape(),
            ArrayData::Chunked(arr) => arr.shape(),
        }
    }

    pub fn dtype(&self) -> &DType {
        match self {
            ArrayData::InMemory(buf) => buf.dtype(),
            ArrayData::Chunked(arr) => arr.dtype(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Capability check: can this array be indexed by block coordinates?
    pub fn supports_block_indexing(&self) -> bool {
        matches!(self, ArrayData::Chunked(_))
    }

    /// The full backing buffer, regardless of chunking.
    pub fn buffer(&self) -> &NdBuffer {
        match self {
            ArrayData::InMemory(buf) => buf,
            ArrayData::Chunked(arr) => arr.buffer(),
        }
    }

    /// Reinterpret the backing buffer under a same-width dtype, preserving
    /// any chunk grid.
    pub fn with_dtype(self, dtype: DType) -> Result<ArrayData> {
        match self {
            ArrayData::InMemory(buf) => Ok(ArrayData::InMemory(buf.with_dtype(dtype)?)),
            ArrayData::Chunked(arr) => {
                let chunks = arr.chunks.clone();
                let buffer = arr.buffer.with_dtype(dtype)?;
                Ok(ArrayData::Chunked(ChunkedArray { buffer, chunks }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_buffer(shape: Vec<usize>) -> NdBuffer {
        let n: usize = shape.iter().product();
        NdBuffer::from_vec(shape, (0..n as i64).collect()).unwrap()
    }

    #[test]
    fn test_new_validates_length() {
        let err = NdBuffer::new(DType::Float64, vec![2, 2], vec![0u8; 8]);
        assert!(err.is_err());
        assert!(NdBuffer::new(DType::Float64, vec![2, 2], vec![0u8; 32]).is_ok());
    }

    #[test]
    fn test_scalar_buffer() {
        let buf = NdBuffer::scalar(7.5f64);
        assert_eq!(buf.ndim(), 0);
        assert_eq!(buf.num_elements(), 1);
        assert_eq!(buf.to_vec::<f64>(), vec![7.5]);
    }

    #[test]
    fn test_sub_block_2d() {
        // 3x4 array of 0..12
        let buf = range_buffer(vec![3, 4]);
        let block = buf.sub_block(&[1, 1], &[2, 2]).unwrap();
        assert_eq!(block.shape(), &[2, 2]);
        assert_eq!(block.to_vec::<i64>(), vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_sub_block_full() {
        let buf = range_buffer(vec![2, 3]);
        let block = buf.sub_block(&[0, 0], &[2, 3]).unwrap();
        assert_eq!(block, buf);
    }

    #[test]
    fn test_sub_block_3d() {
        let buf = range_buffer(vec![2, 3, 4]);
        let block = buf.sub_block(&[1, 1, 2], &[1, 2, 2]).unwrap();
        // offsets: (1,1,2)=18, (1,1,3)=19, (1,2,2)=22, (1,2,3)=23
        assert_eq!(block.to_vec::<i64>(), vec![18, 19, 22, 23]);
    }

    #[test]
    fn test_sub_block_out_of_bounds() {
        let buf = range_buffer(vec![3, 4]);
        assert!(buf.sub_block(&[2, 0], &[2, 4]).is_err());
    }

    #[test]
    fn test_write_block_round_trip() {
        let src = range_buffer(vec![4, 6]);
        let block = src.sub_block(&[2, 3], &[2, 3]).unwrap();
        let mut dst = NdBuffer::zeros(DType::Int64, vec![4, 6]);
        dst.write_block(&[2, 3], &block).unwrap();
        let back = dst.sub_block(&[2, 3], &[2, 3]).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn test_split_uniform() {
        let arr = ChunkedArray::split(range_buffer(vec![10, 6]), &[4, 3]).unwrap();
        assert_eq!(arr.chunks(), &[vec![4, 4, 2], vec![3, 3]]);
        assert_eq!(arr.chunk_size(), vec![4, 3]);
        assert_eq!(arr.grid_shape(), vec![3, 2]);
        assert!(arr.is_uniform());
    }

    #[test]
    fn test_with_chunks_validates_sum() {
        let buf = range_buffer(vec![10]);
        assert!(ChunkedArray::with_chunks(buf.clone(), vec![vec![4, 4, 4]]).is_err());
        assert!(ChunkedArray::with_chunks(buf, vec![vec![4, 4, 2]]).is_ok());
    }

    #[test]
    fn test_non_uniform_detection() {
        let buf = range_buffer(vec![15]);
        // (4, 10, 1): two distinct non-final sizes
        let arr = ChunkedArray::with_chunks(buf.clone(), vec![vec![4, 10, 1]]).unwrap();
        assert!(!arr.is_uniform());
        // (4, 5, 6): final larger than first
        let arr = ChunkedArray::with_chunks(buf.clone(), vec![vec![4, 5, 6]]).unwrap();
        assert!(!arr.is_uniform());
        // (5, 5, 5): uniform
        let arr = ChunkedArray::with_chunks(buf, vec![vec![5, 5, 5]]).unwrap();
        assert!(arr.is_uniform());
    }

    #[test]
    fn test_block_extraction() {
        let arr = ChunkedArray::split(range_buffer(vec![4, 4]), &[2, 2]).unwrap();
        let block = arr.block(&[1, 0]).unwrap();
        assert_eq!(block.to_vec::<i64>(), vec![8, 9, 12, 13]);
    }

    #[test]
    fn test_block_edge_is_short() {
        let arr = ChunkedArray::split(range_buffer(vec![5, 2]), &[3, 2]).unwrap();
        let edge = arr.block(&[1, 0]).unwrap();
        assert_eq!(edge.shape(), &[2, 2]);
        assert_eq!(edge.to_vec::<i64>(), vec![6, 7, 8, 9]);
    }

    #[test]
    fn test_block_out_of_range() {
        let arr = ChunkedArray::split(range_buffer(vec![4]), &[2]).unwrap();
        assert!(matches!(
            arr.block(&[2]),
            Err(ModelError::BlockOutOfBounds { .. })
        ));
        assert!(arr.block(&[1, 0]).is_err());
    }

    #[test]
    fn test_rechunk_preserves_data() {
        let buf = range_buffer(vec![15]);
        let arr = ChunkedArray::with_chunks(buf.clone(), vec![vec![4, 10, 1]]).unwrap();
        let rechunked = arr.rechunk(&[5]).unwrap();
        assert!(rechunked.is_uniform());
        assert_eq!(rechunked.buffer(), &buf);
        assert_eq!(rechunked.chunks(), &[vec![5, 5, 5]]);
    }

    #[test]
    fn test_array_data_capability() {
        let mem = ArrayData::InMemory(range_buffer(vec![4]));
        assert!(!mem.supports_block_indexing());
        let chunked =
            ArrayData::Chunked(ChunkedArray::split(range_buffer(vec![4]), &[2]).unwrap());
        assert!(chunked.supports_block_indexing());
    }
}

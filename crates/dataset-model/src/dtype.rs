//! Coded data types for array storage.
//!
//! Each variant maps to a Zarr v2 dtype string. Multi-byte types are
//! little-endian on the wire, matching the `<` prefix in the dtype string.

use serde::{Deserialize, Serialize};

/// Storage data type of an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Nanoseconds since the Unix epoch.
    DateTime64,
    /// Fixed-length byte string of the given width.
    Bytes(usize),
    /// Opaque per-element objects. Carries no byte representation and
    /// cannot be encoded into chunks.
    Object,
}

/// Coarse classification of a [`DType`], used to pick fill-value encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DTypeKind {
    Bool,
    Int,
    UInt,
    Float,
    Complex,
    DateTime,
    Bytes,
    Object,
}

impl DType {
    /// The Zarr v2 dtype string, e.g. `<f8` or `|S4`.
    pub fn zarr_str(&self) -> String {
        match self {
            DType::Bool => "|b1".to_string(),
            DType::Int8 => "|i1".to_string(),
            DType::Int16 => "<i2".to_string(),
            DType::Int32 => "<i4".to_string(),
            DType::Int64 => "<i8".to_string(),
            DType::UInt8 => "|u1".to_string(),
            DType::UInt16 => "<u2".to_string(),
            DType::UInt32 => "<u4".to_string(),
            DType::UInt64 => "<u8".to_string(),
            DType::Float32 => "<f4".to_string(),
            DType::Float64 => "<f8".to_string(),
            DType::Complex64 => "<c8".to_string(),
            DType::Complex128 => "<c16".to_string(),
            DType::DateTime64 => "<M8[ns]".to_string(),
            DType::Bytes(n) => format!("|S{n}"),
            DType::Object => "|O".to_string(),
        }
    }

    /// Size of one element in bytes. Zero for [`DType::Object`].
    pub fn item_size(&self) -> usize {
        match self {
            DType::Bool | DType::Int8 | DType::UInt8 => 1,
            DType::Int16 | DType::UInt16 => 2,
            DType::Int32 | DType::UInt32 | DType::Float32 => 4,
            DType::Int64
            | DType::UInt64
            | DType::Float64
            | DType::Complex64
            | DType::DateTime64 => 8,
            DType::Complex128 => 16,
            DType::Bytes(n) => *n,
            DType::Object => 0,
        }
    }

    /// Classify this dtype for fill-value encoding dispatch.
    pub fn kind(&self) -> DTypeKind {
        match self {
            DType::Bool => DTypeKind::Bool,
            DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64 => DTypeKind::Int,
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64 => DTypeKind::UInt,
            DType::Float32 | DType::Float64 => DTypeKind::Float,
            DType::Complex64 | DType::Complex128 => DTypeKind::Complex,
            DType::DateTime64 => DTypeKind::DateTime,
            DType::Bytes(_) => DTypeKind::Bytes,
            DType::Object => DTypeKind::Object,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.zarr_str())
    }
}

/// Scalar types that can populate an [`crate::NdBuffer`].
///
/// Sealed by construction: implemented only for the fixed-width primitives
/// this crate stores.
pub trait Element: Copy {
    /// The dtype corresponding to this element type.
    const DTYPE: DType;

    /// Append the little-endian byte representation to `buf`.
    fn extend_le(&self, buf: &mut Vec<u8>);

    /// Read one element back from its little-endian representation.
    fn from_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_element {
    ($ty:ty, $dtype:expr) => {
        impl Element for $ty {
            const DTYPE: DType = $dtype;

            fn extend_le(&self, buf: &mut Vec<u8>) {
                buf.extend_from_slice(&self.to_le_bytes());
            }

            fn from_le(bytes: &[u8]) -> Self {
                let mut arr = [0u8; std::mem::size_of::<$ty>()];
                arr.copy_from_slice(bytes);
                <$ty>::from_le_bytes(arr)
            }
        }
    };
}

impl_element!(i8, DType::Int8);
impl_element!(i16, DType::Int16);
impl_element!(i32, DType::Int32);
impl_element!(i64, DType::Int64);
impl_element!(u8, DType::UInt8);
impl_element!(u16, DType::UInt16);
impl_element!(u32, DType::UInt32);
impl_element!(u64, DType::UInt64);
impl_element!(f32, DType::Float32);
impl_element!(f64, DType::Float64);

impl Element for bool {
    const DTYPE: DType = DType::Bool;

    fn extend_le(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(*self));
    }

    fn from_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zarr_strings() {
        assert_eq!(DType::Float64.zarr_str(), "<f8");
        assert_eq!(DType::Bool.zarr_str(), "|b1");
        assert_eq!(DType::Int8.zarr_str(), "|i1");
        assert_eq!(DType::UInt16.zarr_str(), "<u2");
        assert_eq!(DType::DateTime64.zarr_str(), "<M8[ns]");
        assert_eq!(DType::Bytes(4).zarr_str(), "|S4");
        assert_eq!(DType::Object.zarr_str(), "|O");
    }

    #[test]
    fn test_item_sizes() {
        assert_eq!(DType::Bool.item_size(), 1);
        assert_eq!(DType::Float32.item_size(), 4);
        assert_eq!(DType::Complex128.item_size(), 16);
        assert_eq!(DType::DateTime64.item_size(), 8);
        assert_eq!(DType::Bytes(7).item_size(), 7);
        assert_eq!(DType::Object.item_size(), 0);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(DType::Int32.kind(), DTypeKind::Int);
        assert_eq!(DType::UInt8.kind(), DTypeKind::UInt);
        assert_eq!(DType::Float64.kind(), DTypeKind::Float);
        assert_eq!(DType::Complex64.kind(), DTypeKind::Complex);
        assert_eq!(DType::Bytes(1).kind(), DTypeKind::Bytes);
    }

    #[test]
    fn test_element_round_trip() {
        let mut buf = Vec::new();
        42.5f64.extend_le(&mut buf);
        assert_eq!(buf.len(), 8);
        assert_eq!(f64::from_le(&buf), 42.5);
    }
}

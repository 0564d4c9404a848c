//! Deterministic array generators for tests.

use dataset_model::NdBuffer;

/// A buffer of 0..n as f64, in row-major order.
pub fn range_f64(shape: &[usize]) -> NdBuffer {
    let n: usize = shape.iter().product();
    NdBuffer::from_vec(shape.to_vec(), (0..n).map(|v| v as f64).collect())
        .expect("shape/product mismatch")
}

/// A buffer of 0..n as f32.
pub fn range_f32(shape: &[usize]) -> NdBuffer {
    let n: usize = shape.iter().product();
    NdBuffer::from_vec(shape.to_vec(), (0..n).map(|v| v as f32).collect())
        .expect("shape/product mismatch")
}

/// A buffer of 0..n as i64.
pub fn range_i64(shape: &[usize]) -> NdBuffer {
    let n: usize = shape.iter().product();
    NdBuffer::from_vec(shape.to_vec(), (0..n as i64).collect()).expect("shape/product mismatch")
}

/// `n` six-hourly timestamps starting at the epoch, as a datetime buffer.
pub fn six_hourly_times(n: usize) -> NdBuffer {
    const SIX_HOURS_NS: i64 = 6 * 3600 * 1_000_000_000;
    let timestamps: Vec<i64> = (0..n as i64).map(|i| i * SIX_HOURS_NS).collect();
    NdBuffer::from_datetimes(vec![n], timestamps).expect("timestamp buffer")
}

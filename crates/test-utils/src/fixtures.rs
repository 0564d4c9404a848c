//! Pre-built datasets covering the scenarios the serving stack must handle:
//! plain in-memory variables, chunked variables with short edge chunks,
//! datetime coordinates, scalar variables, and deliberately broken
//! encodings for error-path tests.

use dataset_model::{
    codec_config, ArrayData, AttrValue, ChunkedArray, CompressorSpec, Dataset, Encoding,
    NdBuffer, Variable,
};

use crate::generators::{range_f32, range_f64, range_i64, six_hourly_times};

/// Air-temperature-style dataset: `air(time, lat, lon)` and
/// `tmin(time, lat, lon)` over a datetime coordinate, with global attrs.
/// All variables in-memory (unchunked).
pub fn air_dataset() -> Dataset {
    let mut dataset = Dataset::new()
        .with_attr("title", "4x5x6 air temperature")
        .with_attr("source", "synthetic");

    dataset
        .add_coord(
            "time",
            Variable::new(&["time"], ArrayData::InMemory(six_hourly_times(4)))
                .expect("time coord"),
        )
        .expect("time coord");
    dataset
        .add_coord(
            "lat",
            Variable::new(&["lat"], ArrayData::InMemory(range_f64(&[5])))
                .expect("lat coord")
                .with_attr("units", "degrees_north"),
        )
        .expect("lat coord");
    dataset
        .add_coord(
            "lon",
            Variable::new(&["lon"], ArrayData::InMemory(range_f64(&[6])))
                .expect("lon coord")
                .with_attr("units", "degrees_east"),
        )
        .expect("lon coord");

    dataset
        .add_variable(
            "air",
            Variable::new(&["time", "lat", "lon"], ArrayData::InMemory(range_f32(&[4, 5, 6])))
                .expect("air variable")
                .with_attr("units", "K")
                .with_attr("long_name", "air temperature"),
        )
        .expect("air variable");
    dataset
        .add_variable(
            "tmin",
            Variable::new(&["time", "lat", "lon"], ArrayData::InMemory(range_f32(&[4, 5, 6])))
                .expect("tmin variable")
                .with_attr("units", "K"),
        )
        .expect("tmin variable");

    dataset
}

/// The air dataset with `air` chunked as (2, 3, 4): every axis has a short
/// edge chunk.
pub fn chunked_air_dataset() -> Dataset {
    let mut dataset = Dataset::new().with_attr("title", "chunked air temperature");

    dataset
        .add_coord(
            "time",
            Variable::new(&["time"], ArrayData::InMemory(six_hourly_times(4)))
                .expect("time coord"),
        )
        .expect("time coord");
    dataset
        .add_variable(
            "air",
            Variable::new(
                &["time", "lat", "lon"],
                ArrayData::Chunked(
                    ChunkedArray::split(range_f32(&[4, 5, 6]), &[2, 3, 4]).expect("chunk grid"),
                ),
            )
            .expect("air variable")
            .with_attr("units", "K"),
        )
        .expect("air variable");

    dataset
}

/// Dataset with a shuffle filter and an explicit zlib level on one chunked
/// variable, plus a NaN fill value.
pub fn filtered_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset
        .add_variable(
            "values",
            Variable::new(
                &["y", "x"],
                ArrayData::Chunked(
                    ChunkedArray::split(range_f64(&[6, 4]), &[3, 4]).expect("chunk grid"),
                ),
            )
            .expect("values variable")
            .with_encoding(Encoding {
                compressor: CompressorSpec::Config(codec_config("zlib", &[("level", 4.into())])),
                filters: Some(vec![codec_config("shuffle", &[("elementsize", 8.into())])]),
                fill_value: Some(AttrValue::Float(f64::NAN)),
                ..Encoding::default()
            }),
        )
        .expect("values variable");
    dataset
}

/// Dataset with a single zero-dimensional variable.
pub fn scalar_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset
        .add_variable(
            "constant",
            Variable::scalar(ArrayData::InMemory(NdBuffer::scalar(42.5f64)))
                .expect("scalar variable"),
        )
        .expect("scalar variable");
    dataset
}

/// Dataset whose variable has a non-uniform chunk grid, as produced by
/// concatenating two differently chunked arrays: sizes (4, 10, 1) on one
/// axis.
pub fn non_uniform_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    let array = ChunkedArray::with_chunks(range_i64(&[15]), vec![vec![4, 10, 1]])
        .expect("non-uniform grid");
    dataset
        .add_variable(
            "concat",
            Variable::new(&["x"], ArrayData::Chunked(array)).expect("concat variable"),
        )
        .expect("concat variable");
    dataset
}

/// Dataset whose variable declares encoding chunks `[8, 5, 1]` while the
/// backing array is actually chunked `[4, 5, 1]`.
pub fn mismatched_chunks_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    let array = ChunkedArray::split(range_f64(&[8, 5, 2]), &[4, 5, 1]).expect("chunk grid");
    dataset
        .add_variable(
            "strided",
            Variable::new(&["z", "y", "x"], ArrayData::Chunked(array))
                .expect("strided variable")
                .with_encoding(Encoding {
                    chunks: Some(vec![8, 5, 1]),
                    ..Encoding::default()
                }),
        )
        .expect("strided variable");
    dataset
}

/// Dataset with an object-dtype variable that cannot be chunk-encoded.
pub fn object_dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset
        .add_variable(
            "labels",
            Variable::new(&["x"], ArrayData::InMemory(NdBuffer::object(vec![3])))
                .expect("labels variable"),
        )
        .expect("labels variable");
    dataset
}

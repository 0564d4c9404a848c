//! Array descriptor extraction.
//!
//! Derives one `.zarray`/`.zattrs` pair per variable and fails fast on
//! encoding inconsistencies: serving corrupt metadata is never an option,
//! so disagreements between declared and actual chunking are hard errors
//! at build time, not at request time.

use dataset_model::{ArrayData, CompressorSpec, Dataset};

use crate::codec::{default_compressor, Compressor, Filter};
use crate::encoding::{encode_attr_value, encode_fill_value};
use crate::error::{Result, ZarrError};
use crate::types::{
    Order, ZArray, ZAttrs, COORDINATES_KEY, DIMENSION_KEY, FILL_VALUE_KEY, ZARR_FORMAT,
};
use crate::variables::ZVariable;

/// Resolve the declared chunk shape for a variable and validate it against
/// the backing array.
///
/// Resolution order: explicit encoding `chunks`, else the backing array's
/// actual chunk size, else the full shape (a single chunk).
fn resolve_chunks(name: &str, zvar: &ZVariable) -> Result<Vec<usize>> {
    match &zvar.data {
        ArrayData::Chunked(array) => {
            if !array.is_uniform() {
                return Err(ZarrError::NonUniformChunks {
                    variable: name.to_string(),
                    chunks: array.chunks().to_vec(),
                });
            }
            let inferred = array.chunk_size();
            if let Some(specified) = &zvar.encoding.chunks {
                if *specified != inferred {
                    return Err(ZarrError::ChunkMismatch {
                        variable: name.to_string(),
                        specified: specified.clone(),
                        inferred,
                    });
                }
            }
            Ok(inferred)
        }
        ArrayData::InMemory(buffer) => {
            let shape = buffer.shape().to_vec();
            if let Some(specified) = &zvar.encoding.chunks {
                if *specified != shape {
                    return Err(ZarrError::ChunkMismatch {
                        variable: name.to_string(),
                        specified: specified.clone(),
                        inferred: shape,
                    });
                }
            }
            Ok(shape)
        }
    }
}

/// Resolve the compressor declaration: explicit configuration, explicit
/// none, or the dataset-wide default.
fn resolve_compressor(zvar: &ZVariable) -> Result<Option<Compressor>> {
    match &zvar.encoding.compressor {
        CompressorSpec::Inherit => Ok(Some(default_compressor())),
        CompressorSpec::Disabled => Ok(None),
        CompressorSpec::Config(config) => Ok(Some(Compressor::from_config(config)?)),
    }
}

/// Resolve the filter pipeline. An empty declared list normalizes to none.
fn resolve_filters(zvar: &ZVariable) -> Result<Option<Vec<Filter>>> {
    match &zvar.encoding.filters {
        None => Ok(None),
        Some(configs) if configs.is_empty() => Ok(None),
        Some(configs) => {
            let filters = configs
                .iter()
                .map(Filter::from_config)
                .collect::<Result<Vec<_>>>()?;
            Ok(Some(filters))
        }
    }
}

/// Synthesize the `coordinates` attribute value for a variable: the names
/// of non-dimension coordinates attached to it, alphabetically sorted and
/// space-joined. Sort order is deliberate; datasets do not guarantee
/// coordinate iteration order.
fn coordinate_names(dataset: &Dataset, name: &str, zvar: &ZVariable) -> Option<String> {
    let mut nondim: Vec<&str> = dataset
        .coord_names()
        .iter()
        .filter(|coord| {
            coord.as_str() != name
                && !zvar.dims.contains(coord)
                && dataset
                    .get(coord)
                    .is_some_and(|c| c.dims().iter().all(|d| zvar.dims.contains(d)))
        })
        .map(String::as_str)
        .collect();

    if nondim.is_empty() {
        return None;
    }
    nondim.sort_unstable();
    Some(nondim.join(" "))
}

/// Build the attribute document for one variable: encoded attributes minus
/// `_FillValue`, plus the synthetic dimension-names entry and, when
/// applicable, the synthesized coordinate list.
pub fn extract_variable_zattrs(dataset: &Dataset, name: &str, zvar: &ZVariable) -> ZAttrs {
    let mut zattrs = ZAttrs::new();
    for (key, value) in &zvar.attrs {
        // `_FillValue` belongs in the array descriptor, never in attrs.
        if key == FILL_VALUE_KEY {
            continue;
        }
        zattrs.insert(key.clone(), encode_attr_value(value));
    }
    zattrs.insert(
        DIMENSION_KEY.to_string(),
        serde_json::Value::Array(
            zvar.dims
                .iter()
                .map(|d| serde_json::Value::String(d.clone()))
                .collect(),
        ),
    );
    if let Some(coords) = coordinate_names(dataset, name, zvar) {
        zattrs.insert(COORDINATES_KEY.to_string(), serde_json::Value::String(coords));
    }
    zattrs
}

/// Build the array descriptor for one variable.
pub fn extract_zarray(name: &str, zvar: &ZVariable) -> Result<ZArray> {
    let chunks = resolve_chunks(name, zvar)?;
    let compressor = resolve_compressor(zvar)?;
    let filters = resolve_filters(zvar)?;
    let dtype = zvar.data.dtype();

    Ok(ZArray {
        compressor,
        filters,
        chunks,
        dtype: dtype.zarr_str(),
        fill_value: encode_fill_value(zvar.attrs.get(FILL_VALUE_KEY), dtype),
        order: Order::C,
        shape: zvar.data.shape().to_vec(),
        zarr_format: ZARR_FORMAT,
        dimension_separator: ".".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset_model::{
        codec_config, AttrValue, ChunkedArray, Encoding, NdBuffer, Variable,
    };
    use crate::variables::encode_variable;

    fn range_buffer(shape: Vec<usize>) -> NdBuffer {
        let n: usize = shape.iter().product();
        NdBuffer::from_vec(shape, (0..n).map(|v| v as f64).collect()).unwrap()
    }

    fn zvar(variable: &Variable) -> ZVariable {
        encode_variable(variable).unwrap()
    }

    #[test]
    fn test_unchunked_defaults() {
        let variable =
            Variable::new(&["y", "x"], ArrayData::InMemory(range_buffer(vec![4, 6]))).unwrap();
        let zarray = extract_zarray("v", &zvar(&variable)).unwrap();
        assert_eq!(zarray.chunks, vec![4, 6]);
        assert_eq!(zarray.shape, vec![4, 6]);
        assert_eq!(zarray.dtype, "<f8");
        assert_eq!(zarray.compressor, Some(default_compressor()));
        assert_eq!(zarray.filters, None);
        assert_eq!(zarray.fill_value, serde_json::Value::Null);
    }

    #[test]
    fn test_chunked_uses_grid_chunk_size() {
        let array = ChunkedArray::split(range_buffer(vec![10, 6]), &[4, 3]).unwrap();
        let variable = Variable::new(&["y", "x"], ArrayData::Chunked(array)).unwrap();
        let zarray = extract_zarray("v", &zvar(&variable)).unwrap();
        assert_eq!(zarray.chunks, vec![4, 3]);
        assert_eq!(zarray.shape, vec![10, 6]);
    }

    #[test]
    fn test_chunk_mismatch_is_an_error() {
        let array = ChunkedArray::split(range_buffer(vec![12, 5]), &[4, 5]).unwrap();
        let variable = Variable::new(&["y", "x"], ArrayData::Chunked(array))
            .unwrap()
            .with_encoding(Encoding {
                chunks: Some(vec![8, 5]),
                ..Encoding::default()
            });
        let err = extract_zarray("v", &zvar(&variable)).unwrap_err();
        match err {
            ZarrError::ChunkMismatch {
                variable,
                specified,
                inferred,
            } => {
                assert_eq!(variable, "v");
                assert_eq!(specified, vec![8, 5]);
                assert_eq!(inferred, vec![4, 5]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_uniform_grid_is_an_error() {
        let array =
            ChunkedArray::with_chunks(range_buffer(vec![15]), vec![vec![4, 10, 1]]).unwrap();
        let variable = Variable::new(&["x"], ArrayData::Chunked(array)).unwrap();
        assert!(matches!(
            extract_zarray("v", &zvar(&variable)),
            Err(ZarrError::NonUniformChunks { .. })
        ));
    }

    #[test]
    fn test_unchunked_declared_chunks_must_match_shape() {
        let variable = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![10])))
            .unwrap()
            .with_encoding(Encoding {
                chunks: Some(vec![5]),
                ..Encoding::default()
            });
        assert!(matches!(
            extract_zarray("v", &zvar(&variable)),
            Err(ZarrError::ChunkMismatch { .. })
        ));
    }

    #[test]
    fn test_explicit_compressor_and_filters() {
        let variable = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![8])))
            .unwrap()
            .with_encoding(Encoding {
                compressor: CompressorSpec::Config(codec_config("zlib", &[("level", 4.into())])),
                filters: Some(vec![codec_config("shuffle", &[("elementsize", 8.into())])]),
                ..Encoding::default()
            });
        let zarray = extract_zarray("v", &zvar(&variable)).unwrap();
        assert_eq!(zarray.compressor, Some(Compressor::Zlib { level: 4 }));
        assert_eq!(
            zarray.filters,
            Some(vec![Filter::Shuffle { elementsize: 8 }])
        );
    }

    #[test]
    fn test_disabled_compressor() {
        let variable = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![4])))
            .unwrap()
            .with_encoding(Encoding {
                compressor: CompressorSpec::Disabled,
                ..Encoding::default()
            });
        let zarray = extract_zarray("v", &zvar(&variable)).unwrap();
        assert_eq!(zarray.compressor, None);
    }

    #[test]
    fn test_unknown_codec_fails_build() {
        let variable = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![4])))
            .unwrap()
            .with_encoding(Encoding {
                compressor: CompressorSpec::Config(codec_config("lzma", &[])),
                ..Encoding::default()
            });
        assert!(matches!(
            extract_zarray("v", &zvar(&variable)),
            Err(ZarrError::UnknownCodec(_))
        ));
    }

    #[test]
    fn test_fill_value_extracted_not_duplicated() {
        let variable = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![4])))
            .unwrap()
            .with_attr(FILL_VALUE_KEY, AttrValue::Float(f64::NAN))
            .with_attr("units", "K");
        let dataset = Dataset::new();
        let zvariable = zvar(&variable);
        let zattrs = extract_variable_zattrs(&dataset, "v", &zvariable);
        let zarray = extract_zarray("v", &zvariable).unwrap();
        assert!(!zattrs.contains_key(FILL_VALUE_KEY));
        assert_eq!(zarray.fill_value, serde_json::Value::from("NaN"));
        assert_eq!(zattrs["units"], "K");
        // Extraction is pure: running it again gives the same result.
        assert_eq!(extract_variable_zattrs(&dataset, "v", &zvariable), zattrs);
    }

    #[test]
    fn test_dimension_names_attr() {
        let variable =
            Variable::new(&["time", "lat"], ArrayData::InMemory(range_buffer(vec![2, 3])))
                .unwrap();
        let zattrs = extract_variable_zattrs(&Dataset::new(), "v", &zvar(&variable));
        assert_eq!(zattrs[DIMENSION_KEY], serde_json::json!(["time", "lat"]));
    }

    #[test]
    fn test_coordinates_sorted_and_joined() {
        let mut dataset = Dataset::new();
        let scalar = |v: f64| ArrayData::InMemory(NdBuffer::scalar(v));
        dataset
            .add_coord("zeta", Variable::scalar(scalar(0.0)).unwrap())
            .unwrap();
        dataset
            .add_coord("alpha", Variable::scalar(scalar(1.0)).unwrap())
            .unwrap();
        let variable =
            Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![3]))).unwrap();
        dataset.add_variable("v", variable.clone()).unwrap();

        let zattrs = extract_variable_zattrs(&dataset, "v", &zvar(&variable));
        assert_eq!(zattrs[COORDINATES_KEY], "alpha zeta");
    }

    #[test]
    fn test_no_coordinates_attr_for_dimension_coords() {
        let mut dataset = Dataset::new();
        let x = Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![3]))).unwrap();
        dataset.add_coord("x", x.clone()).unwrap();
        let variable =
            Variable::new(&["x"], ArrayData::InMemory(range_buffer(vec![3]))).unwrap();
        dataset.add_variable("v", variable.clone()).unwrap();

        let zattrs = extract_variable_zattrs(&dataset, "v", &zvar(&variable));
        assert!(!zattrs.contains_key(COORDINATES_KEY));
    }
}

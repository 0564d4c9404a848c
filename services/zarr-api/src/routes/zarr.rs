//! Zarr store endpoints: consolidated metadata, group/attribute documents,
//! per-variable descriptors and chunk payloads.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::debug;
use zarr_store::{
    cache_key, encode_chunk, get_data_chunk, get_zmetadata, get_zvariables, jsonify_zmetadata,
    CacheValue, CostTimer, ZarrError, ARRAY_META_KEY, ATTRS_KEY, GROUP_META_KEY,
};

use crate::error::ApiError;
use crate::routes::resolve_dataset;
use crate::state::AppState;

/// GET `.zmetadata` - the JSON-projected consolidated document.
pub async fn get_zmetadata_doc(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<Value>, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    let _zvariables = get_zvariables(&dataset, &state.cache)?;
    let zmetadata = get_zmetadata(&dataset, &state.cache)?;
    Ok(Json(jsonify_zmetadata(&zmetadata)?))
}

/// GET `.zgroup` - the group descriptor.
pub async fn get_zgroup(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<Value>, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    let zmetadata = get_zmetadata(&dataset, &state.cache)?;
    let entry = zmetadata
        .entry(GROUP_META_KEY)
        .ok_or_else(|| ZarrError::UnknownGroupPath(GROUP_META_KEY.to_string()))?;
    Ok(Json(serde_json::to_value(entry).map_err(ZarrError::from)?))
}

/// GET `.zattrs` - the dataset's encoded global attributes.
pub async fn get_zattrs(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<Value>, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    let zmetadata = get_zmetadata(&dataset, &state.cache)?;
    let entry = zmetadata
        .entry(ATTRS_KEY)
        .ok_or_else(|| ZarrError::UnknownGroupPath(ATTRS_KEY.to_string()))?;
    Ok(Json(serde_json::to_value(entry).map_err(ZarrError::from)?))
}

/// GET `{var}/{key}` - a variable's `.zarray`/`.zattrs` documents, or one
/// encoded chunk.
///
/// Chunk responses are cached under `{dataset_id}/{var}/{key}` with the
/// measured compute time as cost and the encoded length as size.
pub async fn get_variable_key(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Response, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    let var = params.get("var").cloned().unwrap_or_default();
    let key = params.get("chunk").cloned().unwrap_or_default();

    let zvariables = get_zvariables(&dataset, &state.cache)?;
    let zmetadata = get_zmetadata(&dataset, &state.cache)?;

    // Metadata suffixes route to the consolidated document's entries.
    if key.contains(ARRAY_META_KEY) || key.contains(ATTRS_KEY) {
        let suffix = if key.contains(ARRAY_META_KEY) {
            ARRAY_META_KEY
        } else {
            ATTRS_KEY
        };
        let entry = zmetadata
            .entry(&format!("{var}/{suffix}"))
            .ok_or_else(|| ZarrError::UnknownVariable(var.clone()))?;
        let json = serde_json::to_value(entry).map_err(ZarrError::from)?;
        return Ok(Json(json).into_response());
    }
    if key.contains(GROUP_META_KEY) {
        // Flat layout: variables have no subgroups.
        return Err(ZarrError::UnknownGroupPath(format!("{var}/{key}")).into());
    }

    debug!(%var, %key, "chunk request");

    let zvariable = zvariables
        .get(&var)
        .ok_or_else(|| ZarrError::UnknownVariable(var.clone()))?;

    let chunk_cache_key = cache_key(&dataset, &format!("{var}/{key}"));
    {
        let mut cache = state.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(CacheValue::Chunk(bytes)) = cache.get(&chunk_cache_key) {
            return Ok(octet_stream(bytes));
        }
    }

    let zarray = zmetadata
        .entry(&format!("{var}/{ARRAY_META_KEY}"))
        .and_then(|entry| entry.as_array())
        .ok_or_else(|| ZarrError::UnknownVariable(var.clone()))?;

    let timer = CostTimer::start();
    let chunk = get_data_chunk(&zvariable.data, &key, &zarray.chunks)?;
    let encoded = encode_chunk(&chunk, zarray.filters.as_deref(), zarray.compressor.as_ref())?;
    let cost = timer.elapsed();

    {
        let mut cache = state.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.put(
            chunk_cache_key,
            CacheValue::Chunk(encoded.clone()),
            cost,
            encoded.len(),
        );
    }

    Ok(octet_stream(encoded))
}

fn octet_stream(bytes: bytes::Bytes) -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response()
}

//! Dataset summary endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Path};
use axum::Json;
use serde_json::{json, Value};
use zarr_store::{get_zmetadata, get_zvariables, ATTRS_KEY, DIMENSION_KEY};

use crate::error::ApiError;
use crate::routes::resolve_dataset;
use crate::state::AppState;

/// GET `/` - dataset schema: dimensions, per-variable dtype/dims/attributes
/// and global attributes.
pub async fn dataset_summary(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<Value>, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    let zvariables = get_zvariables(&dataset, &state.cache)?;
    let zmetadata = get_zmetadata(&dataset, &state.cache)?;

    let mut variables = serde_json::Map::new();
    for (name, zvariable) in zvariables.iter() {
        let mut attributes = zmetadata
            .entry(&format!("{name}/{ATTRS_KEY}"))
            .and_then(|entry| entry.as_attrs())
            .cloned()
            .unwrap_or_default();
        attributes.remove(DIMENSION_KEY);

        variables.insert(
            name.clone(),
            json!({
                "type": zvariable.data.dtype().zarr_str(),
                "dimensions": zvariable.dims,
                "attributes": attributes,
            }),
        );
    }

    let global_attributes = zmetadata
        .entry(ATTRS_KEY)
        .and_then(|entry| entry.as_attrs())
        .cloned()
        .unwrap_or_default();

    Ok(Json(json!({
        "dimensions": dataset.dims(),
        "variables": variables,
        "global_attributes": global_attributes,
    })))
}

/// GET `/keys` - variable names.
pub async fn list_keys(
    Extension(state): Extension<Arc<AppState>>,
    params: Option<Path<HashMap<String, String>>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let params = params.map(|Path(params)| params).unwrap_or_default();
    let dataset = resolve_dataset(&state, &params)?;
    Ok(Json(
        dataset.variables().map(|(name, _)| name.to_string()).collect(),
    ))
}

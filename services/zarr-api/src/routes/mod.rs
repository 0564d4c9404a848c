//! Request handlers.
//!
//! All handlers work in both serving modes: in collection mode the router
//! nests them under `/datasets/:dataset_id` and the id arrives as a path
//! parameter; in single-dataset mode there is no parameter and the one
//! registered dataset is used.

pub mod datasets;
pub mod health;
pub mod info;
pub mod zarr;

use std::collections::HashMap;
use std::sync::Arc;

use dataset_model::Dataset;

use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the dataset addressed by a request.
pub(crate) fn resolve_dataset(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<Arc<Dataset>, ApiError> {
    match params.get("dataset_id") {
        Some(dataset_id) => state
            .dataset(dataset_id)
            .ok_or_else(|| ApiError::DatasetNotFound(dataset_id.clone())),
        None => state
            .single_dataset()
            .ok_or_else(|| ApiError::DatasetNotFound("<single>".to_string())),
    }
}

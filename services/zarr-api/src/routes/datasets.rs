//! Dataset collection endpoints.

use std::sync::Arc;

use axum::extract::Extension;
use axum::Json;

use crate::state::AppState;

/// GET `/datasets` - ids of every served dataset, registry and providers
/// combined.
pub async fn list_datasets(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dataset_ids())
}

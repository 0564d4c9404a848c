//! Health check endpoint.

use serde::Serialize;

use axum::Json;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// GET `/health` - liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "zarr-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

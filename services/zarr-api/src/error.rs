//! HTTP error mapping for store failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use zarr_store::ZarrError;

/// Request-level errors, each mapping to one status code.
#[derive(Error, Debug)]
pub enum ApiError {
    /// No dataset registered or provided under the requested id.
    #[error("dataset {0:?} not found")]
    DatasetNotFound(String),

    /// A store failure; the kind decides the status code.
    #[error(transparent)]
    Store(#[from] ZarrError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::DatasetNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(err) => match err {
                // Client named something that does not exist.
                ZarrError::UnknownVariable(_) | ZarrError::UnknownGroupPath(_) => {
                    StatusCode::NOT_FOUND
                }
                // Client sent a key the grid cannot address.
                ZarrError::InvalidChunkKey { .. } => StatusCode::BAD_REQUEST,
                // Data-side failures: nothing the client can fix.
                ZarrError::ChunkMismatch { .. }
                | ZarrError::NonUniformChunks { .. }
                | ZarrError::UnencodableObjectArray
                | ZarrError::UnknownCodec(_)
                | ZarrError::Codec(_)
                | ZarrError::Model(_)
                | ZarrError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

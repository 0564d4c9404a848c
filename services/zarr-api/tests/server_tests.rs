//! Router-level tests for the zarr-api service.
//!
//! Each test drives the assembled axum router with one-shot requests and
//! checks status codes, media types and payloads against the store crate's
//! own derivations.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use dataset_model::Dataset;
use test_utils::{air_dataset, chunked_air_dataset, object_dataset, scalar_dataset};
use tower::ServiceExt;
use zarr_api::{DatasetProvider, ZarrApi};
use zarr_store::{create_zmetadata, decode_chunk, jsonify_zmetadata, ZEntry};

async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>, Option<String>) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), content_type)
}

fn single_air_router() -> Router {
    ZarrApi::single(air_dataset()).build_router()
}

#[tokio::test]
async fn test_health() {
    let (status, body, _) = get(&single_air_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "zarr-api");
}

#[tokio::test]
async fn test_zmetadata_matches_store_derivation() {
    let (status, body, content_type) = get(&single_air_router(), "/zarr/.zmetadata").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("application/json"));

    let served: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let expected = jsonify_zmetadata(&create_zmetadata(&air_dataset()).unwrap()).unwrap();
    assert_eq!(served, expected);
}

#[tokio::test]
async fn test_zgroup() {
    let (status, body, _) = get(&single_air_router(), "/zarr/.zgroup").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({"zarr_format": 2}));
}

#[tokio::test]
async fn test_global_zattrs() {
    let (status, body, _) = get(&single_air_router(), "/zarr/.zattrs").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["title"], "4x5x6 air temperature");
}

#[tokio::test]
async fn test_variable_descriptor_and_attrs() {
    let router = single_air_router();

    let (status, body, _) = get(&router, "/zarr/air/.zarray").await;
    assert_eq!(status, StatusCode::OK);
    let zarray: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(zarray["dtype"], "<f4");
    assert_eq!(zarray["shape"], serde_json::json!([4, 5, 6]));

    let (status, body, _) = get(&router, "/zarr/air/.zattrs").await;
    assert_eq!(status, StatusCode::OK);
    let zattrs: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        zattrs["_ARRAY_DIMENSIONS"],
        serde_json::json!(["time", "lat", "lon"])
    );
    assert_eq!(zattrs["units"], "K");
}

#[tokio::test]
async fn test_chunk_payload_round_trips() {
    let router = ZarrApi::single(chunked_air_dataset()).build_router();

    let (status, body, content_type) = get(&router, "/zarr/air/0.0.0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));

    let zmeta = create_zmetadata(&chunked_air_dataset()).unwrap();
    let zarray = match &zmeta.metadata["air/.zarray"] {
        ZEntry::Array(zarray) => zarray.clone(),
        _ => unreachable!(),
    };
    let decoded =
        decode_chunk(&body, zarray.filters.as_deref(), zarray.compressor.as_ref()).unwrap();
    // 2x3x4 f32 chunk.
    assert_eq!(decoded.len(), 2 * 3 * 4 * 4);

    // Repeated requests serve byte-identical content (second hit is cached).
    let (_, second, _) = get(&router, "/zarr/air/0.0.0").await;
    assert_eq!(body, second);
}

#[tokio::test]
async fn test_scalar_chunk_key() {
    let router = ZarrApi::single(scalar_dataset()).build_router();
    let (status, body, _) = get(&router, "/zarr/constant/0").await;
    assert_eq!(status, StatusCode::OK);
    let decoded = decode_chunk(
        &body,
        None,
        Some(&zarr_store::default_compressor()),
    )
    .unwrap();
    assert_eq!(decoded, 42.5f64.to_le_bytes());
}

#[tokio::test]
async fn test_unknown_variable_is_404() {
    let (status, _, _) = get(&single_air_router(), "/zarr/missing/.zarray").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = get(&single_air_router(), "/zarr/missing/0.0.0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subgroup_paths_are_404() {
    let (status, _, _) = get(&single_air_router(), "/zarr/air/.zgroup").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_chunk_key_is_400() {
    // `air` is unchunked; its only valid key is 0.0.0.
    let (status, body, _) = get(&single_air_router(), "/zarr/air/1.0.0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("0.0.0"));

    let (status, _, _) = get(&single_air_router(), "/zarr/air/not-a-key").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_object_variable_chunk_is_500() {
    let router = ZarrApi::single(object_dataset()).build_router();
    let (status, _, _) = get(&router, "/zarr/labels/0").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_collection_mode_listing_and_prefix() {
    let router = ZarrApi::new()
        .with_dataset("air", air_dataset())
        .with_dataset("scalar", scalar_dataset())
        .build_router();

    let (status, body, _) = get(&router, "/datasets").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(ids, vec!["air", "scalar"]);

    let (status, _, _) = get(&router, "/datasets/air/zarr/.zmetadata").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(&router, "/datasets/nope/zarr/.zmetadata").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_keys_and_summary() {
    let router = single_air_router();

    let (status, body, _) = get(&router, "/keys").await;
    assert_eq!(status, StatusCode::OK);
    let keys: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(keys, vec!["time", "lat", "lon", "air", "tmin"]);

    let (status, body, _) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    let summary: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["dimensions"]["lat"], 5);
    assert_eq!(summary["variables"]["air"]["type"], "<f4");
    assert_eq!(summary["global_attributes"]["source"], "synthetic");
}

struct ScalarProvider;

impl DatasetProvider for ScalarProvider {
    fn name(&self) -> &str {
        "scalar-provider"
    }

    fn dataset_ids(&self) -> Vec<String> {
        vec!["provided".to_string()]
    }

    fn dataset(&self, dataset_id: &str) -> Option<Arc<Dataset>> {
        (dataset_id == "provided").then(|| {
            let mut dataset = scalar_dataset();
            dataset.set_dataset_id("provided");
            Arc::new(dataset)
        })
    }
}

#[tokio::test]
async fn test_provider_supplies_datasets() {
    let router = ZarrApi::new()
        .with_dataset("air", air_dataset())
        .with_provider(Box::new(ScalarProvider))
        .build_router();

    let (status, body, _) = get(&router, "/datasets").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<String> = serde_json::from_slice(&body).unwrap();
    assert_eq!(ids, vec!["air", "provided"]);

    let (status, _, _) = get(&router, "/datasets/provided/zarr/.zmetadata").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = get(&router, "/datasets/provided/zarr/constant/.zarray").await;
    assert_eq!(status, StatusCode::OK);
    let zarray: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(zarray["shape"], serde_json::json!([]));
}

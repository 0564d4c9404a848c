//! HTTP service exposing in-memory datasets as Zarr v2 stores.
//!
//! Build an application with [`ZarrApi`]: register datasets (and optional
//! [`DatasetProvider`] hooks), then turn it into an axum router or serve
//! it directly.
//!
//! ```ignore
//! use zarr_api::ZarrApi;
//!
//! let app = ZarrApi::new()
//!     .with_dataset("air", air_dataset)
//!     .with_cache_bytes(64 * 1024 * 1024)
//!     .build_router();
//! ```
//!
//! Collection mode serves every dataset under `/datasets/{dataset_id}/...`
//! and lists ids at `/datasets`; [`ZarrApi::single`] serves one dataset at
//! the root with no prefix.

pub mod config;
pub mod error;
pub mod provider;
pub mod routes;
pub mod state;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use dataset_model::Dataset;
use tower_http::trace::TraceLayer;
use tracing::info;
use zarr_store::shared_cache;

pub use config::ApiConfig;
pub use error::ApiError;
pub use provider::DatasetProvider;
pub use state::AppState;

/// Default response-cache budget: 1 MB.
const DEFAULT_CACHE_BYTES: usize = 1_000_000;

/// Builder for the serving application.
pub struct ZarrApi {
    datasets: BTreeMap<String, Arc<Dataset>>,
    providers: Vec<Box<dyn DatasetProvider>>,
    single: Option<Arc<Dataset>>,
    cache_bytes: usize,
}

impl Default for ZarrApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ZarrApi {
    /// A collection-mode application with no datasets yet.
    pub fn new() -> Self {
        Self {
            datasets: BTreeMap::new(),
            providers: Vec::new(),
            single: None,
            cache_bytes: DEFAULT_CACHE_BYTES,
        }
    }

    /// A single-dataset application: the dataset is served at the root,
    /// with an empty cache namespace.
    pub fn single(dataset: Dataset) -> Self {
        let mut api = Self::new();
        api.single = Some(Arc::new(dataset));
        api
    }

    /// Register a dataset under an id. The id is stamped onto the dataset
    /// so cache keys and metadata stay namespaced per dataset.
    pub fn with_dataset(mut self, dataset_id: &str, mut dataset: Dataset) -> Self {
        dataset.set_dataset_id(dataset_id);
        self.datasets.insert(dataset_id.to_string(), Arc::new(dataset));
        self
    }

    /// Register a provider hook.
    pub fn with_provider(mut self, provider: Box<dyn DatasetProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Set the response-cache byte budget.
    pub fn with_cache_bytes(mut self, cache_bytes: usize) -> Self {
        self.cache_bytes = cache_bytes;
        self
    }

    fn dataset_routes() -> Router {
        Router::new()
            .route("/", get(routes::info::dataset_summary))
            .route("/keys", get(routes::info::list_keys))
            .route("/zarr/.zmetadata", get(routes::zarr::get_zmetadata_doc))
            .route("/zarr/.zgroup", get(routes::zarr::get_zgroup))
            .route("/zarr/.zattrs", get(routes::zarr::get_zattrs))
            .route("/zarr/:var/:chunk", get(routes::zarr::get_variable_key))
    }

    /// Assemble the axum router.
    pub fn build_router(self) -> Router {
        let single_mode = self.single.is_some();

        let mut app = Router::new().route("/health", get(routes::health::health_handler));

        if single_mode {
            app = app.merge(Self::dataset_routes());
        } else {
            app = app
                .route("/datasets", get(routes::datasets::list_datasets))
                .nest("/datasets/:dataset_id", Self::dataset_routes());
        }

        for provider in &self.providers {
            if let Some(router) = provider.app_router() {
                info!(provider = provider.name(), "merging provider routes");
                app = app.merge(router);
            }
        }

        let state = Arc::new(AppState {
            datasets: self.datasets,
            providers: self.providers,
            single: self.single,
            cache: shared_cache(self.cache_bytes),
        });

        app.layer(Extension(state)).layer(TraceLayer::new_for_http())
    }

    /// Bind and serve. Blocking; runs until the process exits.
    pub async fn serve(self, host: &str, port: u16) -> anyhow::Result<()> {
        let app = self.build_router();
        let addr: SocketAddr = format!("{host}:{port}").parse()?;
        info!(%addr, "starting zarr-api server");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;
        Ok(())
    }
}

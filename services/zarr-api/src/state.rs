//! Shared application state.

use std::collections::BTreeMap;
use std::sync::Arc;

use dataset_model::Dataset;
use zarr_store::SharedCache;

use crate::provider::DatasetProvider;

/// State shared by every request handler: the dataset registry, provider
/// hooks, and the process-wide response cache.
pub struct AppState {
    /// Statically registered datasets by id.
    pub(crate) datasets: BTreeMap<String, Arc<Dataset>>,

    /// Provider hooks, consulted before the static registry.
    pub(crate) providers: Vec<Box<dyn DatasetProvider>>,

    /// The dataset served without an id prefix, in single-dataset mode.
    pub(crate) single: Option<Arc<Dataset>>,

    /// Shared byte-budgeted cache.
    pub cache: SharedCache,
}

impl AppState {
    /// All served dataset ids: registered datasets first, then provider
    /// contributions.
    pub fn dataset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.datasets.keys().cloned().collect();
        for provider in &self.providers {
            for id in provider.dataset_ids() {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    /// Resolve a dataset by id, providers first.
    pub fn dataset(&self, dataset_id: &str) -> Option<Arc<Dataset>> {
        for provider in &self.providers {
            if let Some(dataset) = provider.dataset(dataset_id) {
                return Some(dataset);
            }
        }
        self.datasets.get(dataset_id).cloned()
    }

    /// The single-mode dataset, if serving one dataset without a prefix.
    pub fn single_dataset(&self) -> Option<Arc<Dataset>> {
        self.single.clone()
    }
}

//! Dataset provider hooks.
//!
//! Providers extend the service without touching its wiring: they can
//! supply datasets (consulted before the static registry, so a provider
//! can also override resolution) and contribute additional top-level
//! routes. This is plain dependency injection; providers are registered
//! on the [`crate::ZarrApi`] builder, not discovered globally.

use std::sync::Arc;

use axum::Router;
use dataset_model::Dataset;

/// Hook surface for supplying datasets and extra routes.
pub trait DatasetProvider: Send + Sync + 'static {
    /// Stable name, for logs.
    fn name(&self) -> &str;

    /// Dataset ids this provider serves.
    fn dataset_ids(&self) -> Vec<String> {
        Vec::new()
    }

    /// Resolve one dataset by id. Consulted before the static registry.
    fn dataset(&self, _dataset_id: &str) -> Option<Arc<Dataset>> {
        None
    }

    /// Additional top-level routes to merge into the application.
    fn app_router(&self) -> Option<Router> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        dataset: Arc<Dataset>,
    }

    impl DatasetProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn dataset_ids(&self) -> Vec<String> {
            vec!["fixed".to_string()]
        }

        fn dataset(&self, dataset_id: &str) -> Option<Arc<Dataset>> {
            (dataset_id == "fixed").then(|| Arc::clone(&self.dataset))
        }
    }

    #[test]
    fn test_provider_defaults() {
        let provider = Fixed {
            dataset: Arc::new(Dataset::new()),
        };
        assert_eq!(provider.dataset_ids(), vec!["fixed"]);
        assert!(provider.dataset("fixed").is_some());
        assert!(provider.dataset("other").is_none());
        assert!(provider.app_router().is_none());
    }
}

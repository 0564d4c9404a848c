//! Consolidated metadata documents.
//!
//! One document per dataset: the group descriptor, encoded global
//! attributes, and every variable's `.zattrs`/`.zarray` pair. A build
//! either fully succeeds (and is cached, pinned) or fully fails; partial
//! documents are never produced. Rebuilding an unmodified dataset yields
//! an identical document, which the cache and round-trip tests rely on.

use std::collections::BTreeMap;
use std::sync::Arc;

use dataset_model::{Dataset, DATASET_ID_ATTR_KEY};
use serde_json::Value;
use tracing::debug;

use crate::cache::{cache_key, CacheValue, SharedCache, PERMANENT_COST};
use crate::encoding::encode_attr_value;
use crate::error::Result;
use crate::types::{
    ZAttrs, ZEntry, ZGroup, ZMetadata, ARRAY_META_KEY, ATTRS_KEY, GROUP_META_KEY,
    ZARR_CONSOLIDATED_FORMAT, ZARR_METADATA_KEY,
};
use crate::variables::create_zvariables;
use crate::zarray::{extract_variable_zattrs, extract_zarray};

/// Encode the dataset's global attributes, stripping the internal
/// dataset-identity attribute (bookkeeping, not user data).
fn extract_dataset_zattrs(dataset: &Dataset) -> ZAttrs {
    let mut zattrs = ZAttrs::new();
    for (key, value) in dataset.attrs() {
        if key == DATASET_ID_ATTR_KEY {
            continue;
        }
        zattrs.insert(key.clone(), encode_attr_value(value));
    }
    zattrs
}

/// Build the consolidated metadata document for a dataset.
pub fn create_zmetadata(dataset: &Dataset) -> Result<ZMetadata> {
    let zvariables = create_zvariables(dataset)?;

    let mut metadata = BTreeMap::new();
    metadata.insert(GROUP_META_KEY.to_string(), ZEntry::Group(ZGroup::default()));
    metadata.insert(
        ATTRS_KEY.to_string(),
        ZEntry::Attrs(extract_dataset_zattrs(dataset)),
    );

    for (name, _) in dataset.variables() {
        let zvar = &zvariables[name];
        let zattrs = extract_variable_zattrs(dataset, name, zvar);
        let zarray = extract_zarray(name, zvar)?;
        metadata.insert(format!("{name}/{ATTRS_KEY}"), ZEntry::Attrs(zattrs));
        metadata.insert(format!("{name}/{ARRAY_META_KEY}"), ZEntry::Array(zarray));
    }

    Ok(ZMetadata {
        zarr_consolidated_format: ZARR_CONSOLIDATED_FORMAT,
        metadata,
    })
}

/// Return the consolidated document, building and pinning it in the cache
/// on first use. Failed builds cache nothing; the next request retries the
/// full (deterministic) build.
pub fn get_zmetadata(dataset: &Dataset, cache: &SharedCache) -> Result<Arc<ZMetadata>> {
    let key = cache_key(dataset, ZARR_METADATA_KEY);

    {
        let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(CacheValue::Metadata(zmetadata)) = cache.get(&key) {
            return Ok(zmetadata);
        }
    }

    debug!(%key, "building consolidated metadata");
    let zmetadata = Arc::new(create_zmetadata(dataset)?);

    let mut cache = cache.lock().unwrap_or_else(|e| e.into_inner());
    cache.put(
        key,
        CacheValue::Metadata(Arc::clone(&zmetadata)),
        PERMANENT_COST,
        1,
    );
    Ok(zmetadata)
}

/// Project the consolidated document to plain JSON for wire transmission.
/// Codec objects serialize to their plain-data configurations, so the
/// result is renderable by any generic JSON encoder.
pub fn jsonify_zmetadata(zmetadata: &ZMetadata) -> Result<Value> {
    Ok(serde_json::to_value(zmetadata)?)
}

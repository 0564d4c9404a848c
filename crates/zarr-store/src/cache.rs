//! Byte-budgeted, cost-aware cache for derived metadata and encoded chunks.
//!
//! Two classes of entry share one budget: permanently valuable documents
//! (consolidated metadata, the encoded-variable table) inserted with
//! [`PERMANENT_COST`] and size 1, and chunk responses inserted with their
//! measured compute time as cost and their encoded byte length as size.
//! When the budget is exceeded, the entry with the lowest cost density
//! (cost per byte, oldest access breaking ties) is evicted first, so pinned
//! documents outlive any realistic chunk churn.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use bytes::Bytes;
use dataset_model::Dataset;
use tracing::{debug, warn};

use crate::types::ZMetadata;
use crate::variables::ZVariables;

/// Cost assigned to entries that should effectively never be evicted.
pub const PERMANENT_COST: f64 = 99999.0;

/// Values the cache can hold. Cloning is cheap: documents are shared via
/// `Arc`, chunk payloads via `Bytes`.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Metadata(Arc<ZMetadata>),
    Variables(Arc<ZVariables>),
    Chunk(Bytes),
}

struct Entry {
    value: CacheValue,
    cost: f64,
    size: usize,
    last_access: u64,
}

impl Entry {
    /// Eviction score: lowest goes first.
    fn density(&self) -> f64 {
        self.cost / self.size.max(1) as f64
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub memory_bytes: u64,
    pub evictions: u64,
}

/// Cost-based cache with a byte budget.
pub struct Cache {
    available_bytes: usize,
    entries: HashMap<String, Entry>,
    current_bytes: usize,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Cache {
    /// Create a cache with the given byte budget.
    pub fn new(available_bytes: usize) -> Self {
        Self {
            available_bytes,
            entries: HashMap::new(),
            current_bytes: 0,
            tick: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a key, refreshing its recency on a hit.
    pub fn get(&mut self, key: &str) -> Option<CacheValue> {
        self.tick += 1;
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.last_access = self.tick;
                self.hits += 1;
                Some(entry.value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Check for a key without touching recency or counters.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value with its compute cost (seconds) and size (bytes, or 1
    /// for pinned documents). Entries larger than the whole budget are not
    /// admitted; over-budget insertion evicts the lowest cost density first.
    pub fn put(&mut self, key: String, value: CacheValue, cost: f64, size: usize) {
        if size > self.available_bytes {
            warn!(%key, size, budget = self.available_bytes, "cache entry larger than budget, not admitted");
            return;
        }

        self.tick += 1;
        if let Some(old) = self.entries.insert(
            key,
            Entry {
                value,
                cost,
                size,
                last_access: self.tick,
            },
        ) {
            self.current_bytes = self.current_bytes.saturating_sub(old.size);
        }
        self.current_bytes += size;

        while self.current_bytes > self.available_bytes {
            if !self.evict_one() {
                break;
            }
        }
    }

    /// Evict the entry with the lowest cost density. Returns false when the
    /// cache is empty.
    fn evict_one(&mut self) -> bool {
        let victim = self
            .entries
            .iter()
            .min_by(|(_, a), (_, b)| {
                a.density()
                    .partial_cmp(&b.density())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.last_access.cmp(&b.last_access))
            })
            .map(|(key, _)| key.clone());

        match victim {
            Some(key) => {
                if let Some(entry) = self.entries.remove(&key) {
                    self.current_bytes = self.current_bytes.saturating_sub(entry.size);
                    self.evictions += 1;
                    debug!(%key, size = entry.size, "evicted cache entry");
                }
                true
            }
            None => false,
        }
    }

    /// Remove one entry. Explicit invalidation; no-op for absent keys.
    pub fn remove(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.current_bytes = self.current_bytes.saturating_sub(entry.size);
        }
    }

    /// Remove every entry belonging to a dataset id. Used when a served
    /// dataset is replaced.
    pub fn invalidate_dataset(&mut self, dataset_id: &str) {
        let prefix = format!("{dataset_id}/");
        let keys: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for key in keys {
            self.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn memory_usage(&self) -> usize {
        self.current_bytes
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
            memory_bytes: self.current_bytes as u64,
            evictions: self.evictions,
        }
    }
}

/// The process-wide shared cache handle. Lock windows stay short (single
/// get/put); derivations never run under the lock.
pub type SharedCache = Arc<Mutex<Cache>>;

/// Create a shared cache with the given byte budget.
pub fn shared_cache(available_bytes: usize) -> SharedCache {
    Arc::new(Mutex::new(Cache::new(available_bytes)))
}

/// Dataset-scoped cache key: `"{dataset_id}/{suffix}"`, with an empty id
/// for single-dataset serving.
pub fn cache_key(dataset: &Dataset, suffix: &str) -> String {
    format!("{}/{}", dataset.dataset_id().unwrap_or(""), suffix)
}

/// Wall-clock timer for chunk admission costs.
pub struct CostTimer {
    start: Instant,
}

impl CostTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed wall time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for CostTimer {
    fn default() -> Self {
        Self::start()
    }
}

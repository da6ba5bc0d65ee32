//! Instance-owned parameter catalog cache.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::adapter::CatalogRecord;
use crate::engine::CatalogSource;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CachedCatalog {
    fetched_at: Instant,
    source: CatalogSource,
    records: Vec<CatalogRecord>,
}

/// Catalogs fetched from adapters, keyed by dataset.
///
/// Entries older than the TTL are treated as missing. A zero TTL disables
/// caching.
#[derive(Debug)]
pub struct CatalogCache {
    ttl: Duration,
    entries: Mutex<BTreeMap<String, CachedCatalog>>,
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl CatalogCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a fresh cached catalog for `dataset`, evicting a stale one.
    pub fn get(&self, dataset: &str) -> Option<(CatalogSource, Vec<CatalogRecord>)> {
        let mut entries = self.entries();
        let cached = entries.get(dataset)?;
        if cached.fetched_at.elapsed() < self.ttl {
            return Some((cached.source, cached.records.clone()));
        }
        debug!(dataset, "catalog cache entry expired");
        entries.remove(dataset);
        None
    }

    pub fn insert(&self, dataset: &str, source: CatalogSource, records: Vec<CatalogRecord>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries().insert(
            dataset.to_string(),
            CachedCatalog {
                fetched_at: Instant::now(),
                source,
                records,
            },
        );
    }

    /// Drops the entry for `dataset`. Returns whether one was present.
    pub fn invalidate(&self, dataset: &str) -> bool {
        self.entries().remove(dataset).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, CachedCatalog>> {
        // Entries are plain data; a panic elsewhere cannot leave them torn.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entries_are_served() {
        let cache = CatalogCache::default();
        cache.insert("SITE", CatalogSource::Harvest, vec![CatalogRecord::new("a")]);

        let (source, records) = cache.get("SITE").expect("cached");
        assert_eq!(source, CatalogSource::Harvest);
        assert_eq!(records.len(), 1);
        assert!(cache.get("OTHER").is_none());
    }

    #[test]
    fn zero_ttl_disables_caching() {
        let cache = CatalogCache::new(Duration::ZERO);
        cache.insert("SITE", CatalogSource::Harvest, vec![CatalogRecord::new("a")]);
        assert!(cache.is_empty());
        assert!(cache.get("SITE").is_none());
    }

    #[test]
    fn invalidate_and_clear() {
        let cache = CatalogCache::default();
        cache.insert("A", CatalogSource::Capabilities, Vec::new());
        cache.insert("B", CatalogSource::Harvest, Vec::new());

        assert!(cache.invalidate("A"));
        assert!(!cache.invalidate("A"));
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}

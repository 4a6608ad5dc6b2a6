use std::future::Future;
use std::sync::{Arc, Weak};
use parking_lot::RwLock;
use tracing::debug;
use crate::cache::ttl::{CacheStats, TtlCache};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::CatalogStats;
use crate::core::types::{Record, RecordId, RecordSet};
use crate::index::search_index::SearchIndex;
use crate::loader::manifest::Manifest;
use crate::search::suggest::SuggestIndex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Manifest,
    Records,
    Stats,
    SearchEntries,
    Record(RecordId),
}

#[derive(Clone)]
pub enum CachedValue {
    Manifest(Arc<Manifest>),
    Records(RecordSet),
    /// Stats remember the index they were computed from
    Stats { source: Weak<SearchIndex>, stats: Arc<CatalogStats> },
    /// `None` when the catalog publishes no search file
    SearchEntries(Option<Arc<SuggestIndex>>),
    Record(Arc<Record>),
}

fn mismatch(key: &CacheKey) -> Error {
    Error::new(ErrorKind::Internal, format!("cache entry for {:?} holds another type", key))
}

/// Catalog-level caches: loaded artifacts in a TTL cache plus the built
/// search index in a swap slot
pub struct CacheLayer {
    entries: TtlCache<CacheKey, CachedValue>,
    index: RwLock<Option<Arc<SearchIndex>>>,
}

impl CacheLayer {
    pub fn new(config: &Config) -> Self {
        CacheLayer {
            entries: TtlCache::new(config.cache_max_entries, config.cache_ttl()),
            index: RwLock::new(None),
        }
    }

    pub async fn manifest<F, Fut>(&self, load: F) -> Result<Arc<Manifest>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<Manifest>>>,
    {
        let key = CacheKey::Manifest;
        let value = self
            .entries
            .get_or_load_async(key.clone(), || async { load().await.map(CachedValue::Manifest) })
            .await?;
        match value {
            CachedValue::Manifest(manifest) => Ok(manifest),
            _ => Err(mismatch(&key)),
        }
    }

    pub async fn records<F, Fut>(&self, load: F) -> Result<RecordSet>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RecordSet>>,
    {
        let key = CacheKey::Records;
        let value = self
            .entries
            .get_or_load_async(key.clone(), || async { load().await.map(CachedValue::Records) })
            .await?;
        match value {
            CachedValue::Records(records) => Ok(records),
            _ => Err(mismatch(&key)),
        }
    }

    /// Record set if currently cached, without loading or counting a miss
    pub fn cached_records(&self) -> Option<RecordSet> {
        match self.entries.peek(&CacheKey::Records) {
            Some(CachedValue::Records(records)) => Some(records),
            _ => None,
        }
    }

    /// Stats for `index`. A cached entry computed from another index is
    /// recomputed.
    pub fn stats_for<F>(&self, index: &Arc<SearchIndex>, compute: F) -> Result<Arc<CatalogStats>>
    where
        F: FnOnce(&SearchIndex) -> CatalogStats,
    {
        let key = CacheKey::Stats;
        let epoch = self.entries.epoch();
        match self.entries.get(&key) {
            Some(CachedValue::Stats { source, stats }) if source.as_ptr() == Arc::as_ptr(index) => {
                return Ok(stats);
            }
            Some(CachedValue::Stats { .. }) | None => {}
            Some(_) => return Err(mismatch(&key)),
        }

        let stats = Arc::new(compute(index.as_ref()));
        let value = CachedValue::Stats { source: Arc::downgrade(index), stats: stats.clone() };
        self.entries.insert_if_current(epoch, key, value);
        Ok(stats)
    }

    pub async fn search_entries<F, Fut>(&self, load: F) -> Result<Option<Arc<SuggestIndex>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Arc<SuggestIndex>>>>,
    {
        let key = CacheKey::SearchEntries;
        let value = self
            .entries
            .get_or_load_async(key.clone(), || async { load().await.map(CachedValue::SearchEntries) })
            .await?;
        match value {
            CachedValue::SearchEntries(entries) => Ok(entries),
            _ => Err(mismatch(&key)),
        }
    }

    /// Single-record lookups. Only found records are cached.
    pub async fn record<F, Fut>(&self, id: &RecordId, load: F) -> Result<Option<Arc<Record>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Arc<Record>>>>,
    {
        let key = CacheKey::Record(id.clone());
        let epoch = self.entries.epoch();
        match self.entries.get(&key) {
            Some(CachedValue::Record(record)) => return Ok(Some(record)),
            Some(_) => return Err(mismatch(&key)),
            None => {}
        }

        let found = load().await?;
        if let Some(record) = &found {
            self.entries.insert_if_current(epoch, key, CachedValue::Record(record.clone()));
        }
        Ok(found)
    }

    /// Current index, if one has been built since the last invalidation
    pub fn index(&self) -> Option<Arc<SearchIndex>> {
        self.index.read().clone()
    }

    /// Index for `records`, building and swapping in a new one when the slot
    /// is empty or was built from a different record set. A build overtaken
    /// by `invalidate_all` is returned but not installed.
    pub fn index_for<F>(&self, records: &RecordSet, build: F) -> Result<Arc<SearchIndex>>
    where
        F: FnOnce(RecordSet) -> Result<SearchIndex>,
    {
        let epoch = self.entries.epoch();
        if let Some(index) = self.index.read().as_ref() {
            if index.is_built_from(records) {
                return Ok(index.clone());
            }
        }

        debug!(records = records.len(), "index slot stale, rebuilding");
        let built = Arc::new(build(records.clone())?);

        let mut slot = self.index.write();
        // Another caller may have installed an index for the same set meanwhile
        if let Some(current) = slot.as_ref() {
            if current.is_built_from(records) {
                return Ok(current.clone());
            }
        }
        if self.entries.epoch() != epoch {
            debug!("cache invalidated during index build, not installing");
            return Ok(built);
        }
        *slot = Some(built.clone());
        Ok(built)
    }

    /// Drops every cached entry and the index
    pub fn invalidate_all(&self) {
        // Clear the slot under its lock before bumping the epoch so a build
        // that checks the epoch after this cannot install into a cleared slot
        let mut slot = self.index.write();
        self.entries.invalidate_all();
        *slot = None;
        drop(slot);
        debug!("catalog caches cleared");
    }

    pub fn stats_snapshot(&self) -> CacheStats {
        self.entries.stats()
    }
}

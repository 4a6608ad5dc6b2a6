use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use crate::core::error::Result;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded cache whose entries expire a fixed time after insertion.
/// Reads never refresh an entry, so eviction at capacity drops the
/// oldest insertion first.
pub struct TtlCache<K, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    /// Bumped by `invalidate_all`; loads started under an older epoch are not stored
    epoch: AtomicU64,
    ttl: Duration,
    capacity: usize,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl<K: Hash + Eq + Clone, V: Clone> TtlCache<K, V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        TtlCache {
            entries: Mutex::new(LruCache::new(cap)),
            epoch: AtomicU64::new(0),
            ttl,
            capacity: cap.get(),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    /// Live value for `key`; an expired entry is dropped and counts as a miss
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        let fresh = entries.peek(key).map(|entry| entry.inserted_at.elapsed() < self.ttl);
        match fresh {
            Some(true) => {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                entries.peek(key).map(|entry| entry.value.clone())
            }
            Some(false) => {
                entries.pop(key);
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.lock();
        Self::put(&mut entries, key, value);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Inserts unless `invalidate_all` ran since `epoch` was read.
    /// Returns whether the value was stored.
    pub fn insert_if_current(&self, epoch: u64, key: K, value: V) -> bool {
        let mut entries = self.entries.lock();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        Self::put(&mut entries, key, value);
        true
    }

    fn put(entries: &mut LruCache<K, Entry<V>>, key: K, value: V) {
        // Re-inserting counts as a new insertion for eviction order
        entries.pop(&key);
        entries.put(key, Entry { value, inserted_at: Instant::now() });
    }

    pub fn get_or_load<F>(&self, key: K, loader: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let epoch = self.epoch();
        let value = loader()?;
        self.insert_if_current(epoch, key, value.clone());
        Ok(value)
    }

    /// Async variant; the lock is released while `loader` runs, so
    /// concurrent misses on one key may each invoke their loader. A load
    /// overtaken by `invalidate_all` returns its value without storing it.
    pub async fn get_or_load_async<F, Fut>(&self, key: K, loader: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let epoch = self.epoch();
        let value = loader().await?;
        self.insert_if_current(epoch, key, value.clone());
        Ok(value)
    }

    /// Raw lookup that leaves the hit/miss counters alone
    pub fn peek(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock();
        entries
            .peek(key)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.lock().pop(key);
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries.lock();
        entries.clear();
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            size: self.len(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hit_count: usize,
    pub miss_count: usize,
    pub size: usize,
    pub capacity: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use crate::core::error::{Error, ErrorKind};

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl_reload_after() {
        let cache: TtlCache<&str, u32> = TtlCache::new(10, Duration::from_secs(300));
        let calls = AtomicU32::new(0);
        let load = || -> Result<u32> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(calls.load(Ordering::SeqCst))
        };

        assert_eq!(cache.get_or_load("k", load).unwrap(), 1);
        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get_or_load("k", load).unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get_or_load("k", load).unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn evicts_oldest_insertion_at_capacity() {
        let cache = TtlCache::new(2, Duration::from_secs(60));
        cache.insert("a", 1);
        cache.insert("b", 2);
        // Reads do not refresh
        assert_eq!(cache.get(&"a"), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache: TtlCache<u8, u8> = TtlCache::new(4, Duration::from_secs(60));
        let err = cache
            .get_or_load(1, || Err(Error::new(ErrorKind::Internal, "boom")))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_load(1, || Ok(9)).unwrap(), 9);
    }

    #[tokio::test]
    async fn async_loader_runs_once_per_key() {
        let cache: TtlCache<String, u32> = TtlCache::new(4, Duration::from_secs(60));
        let calls = AtomicU32::new(0);
        for _ in 0..3 {
            let value = cache
                .get_or_load_async("k".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!((stats.hit_count, stats.miss_count), (2, 1));
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn load_overtaken_by_invalidation_is_not_stored() {
        let cache: TtlCache<&str, u32> = TtlCache::new(4, Duration::from_secs(60));
        let value = cache
            .get_or_load_async("k", || async {
                cache.invalidate_all();
                Ok(1)
            })
            .await
            .unwrap();
        assert_eq!(value, 1);
        assert_eq!(cache.peek(&"k"), None);

        // Loads started after the invalidation are stored as usual
        cache.get_or_load_async("k", || async { Ok(2) }).await.unwrap();
        assert_eq!(cache.peek(&"k"), Some(2));
    }

    #[test]
    fn stale_epoch_insert_is_rejected() {
        let cache = TtlCache::new(4, Duration::from_secs(60));
        let epoch = cache.epoch();
        cache.invalidate_all();
        assert!(!cache.insert_if_current(epoch, 1, "old"));
        assert!(cache.insert_if_current(cache.epoch(), 1, "new"));
        assert_eq!(cache.peek(&1), Some("new"));
    }

    #[test]
    fn invalidate_all_clears_entries() {
        let cache = TtlCache::new(4, Duration::from_secs(60));
        cache.insert(1, "one");
        cache.insert(2, "two");
        cache.invalidate(&1);
        assert_eq!(cache.peek(&1), None);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}

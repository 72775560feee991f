//! Memoized range aggregations.
//!
//! ## Cache Key Structure
//! `(start, end, resolution)`; the region is always the coverage area.
//!
//! ## Eviction Strategy
//! Entry-count LRU. Results with failed days are returned to the caller
//! but never stored, so a later request retries the missing days.

use chrono::NaiveDate;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use hex_common::{AggregationResult, GridResult};

/// Cache key for range aggregations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AggregationKey {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub resolution: u8,
}

impl AggregationKey {
    pub fn new(start: NaiveDate, end: NaiveDate, resolution: u8) -> Self {
        Self {
            start,
            end,
            resolution,
        }
    }
}

impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@res{}", self.start, self.end, self.resolution)
    }
}

/// Statistics for the aggregation cache.
#[derive(Default)]
pub struct AggregationCacheCounters {
    /// Total cache hits.
    pub hits: AtomicU64,
    /// Total cache misses.
    pub misses: AtomicU64,
}

/// Point-in-time view of the aggregation cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationCacheStats {
    pub size: usize,
    pub capacity: usize,
    /// Keys from most to least recently used.
    pub keys: Vec<AggregationKey>,
    pub hits: u64,
    pub misses: u64,
}

/// Bounded LRU of range aggregation results.
pub struct AggregationCache {
    entries: Mutex<LruCache<AggregationKey, Arc<AggregationResult>>>,
    capacity: NonZeroUsize,
    counters: AggregationCacheCounters,
}

impl AggregationCache {
    /// Create a cache holding up to `capacity` results (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        info!(capacity = capacity.get(), "Aggregation cache initialized");

        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            counters: AggregationCacheCounters::default(),
        }
    }

    /// Cached result for `key`, refreshing its recency.
    pub async fn get(&self, key: &AggregationKey) -> Option<Arc<AggregationResult>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(result) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(result))
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a result, evicting the least recently used entry when full.
    pub async fn insert(&self, key: AggregationKey, result: Arc<AggregationResult>) {
        let mut entries = self.entries.lock().await;
        if let Some((evicted, _)) = entries.push(key, result) {
            if evicted != key {
                debug!(evicted = %evicted, "Evicted aggregation");
            }
        }
    }

    /// Return the cached result for `key`, or run `compute` and memoize it.
    ///
    /// The lock is not held while computing; concurrent misses on one key
    /// compute independently and the last one stored wins. Errors and
    /// results with failed days are passed through uncached.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: AggregationKey,
        compute: F,
    ) -> GridResult<Arc<AggregationResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GridResult<AggregationResult>>,
    {
        if let Some(result) = self.get(&key).await {
            debug!(key = %key, "Aggregation cache hit");
            return Ok(result);
        }

        let result = Arc::new(compute().await?);
        if result.is_complete() {
            self.insert(key, Arc::clone(&result)).await;
        } else {
            info!(
                key = %key,
                failed_days = result.failed_days.len(),
                "Partial aggregation not cached"
            );
        }
        Ok(result)
    }

    /// Drop every entry; returns how many were removed.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub async fn stats(&self) -> AggregationCacheStats {
        let entries = self.entries.lock().await;
        AggregationCacheStats {
            size: entries.len(),
            capacity: self.capacity.get(),
            keys: entries.iter().map(|(k, _)| *k).collect(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_common::{AggregationScope, GridError};
    use std::sync::atomic::AtomicUsize;
    use test_utils::fixtures::dates::august;

    fn key(day: u32) -> AggregationKey {
        AggregationKey::new(august(1), august(day), 6)
    }

    fn result_for(k: AggregationKey) -> AggregationResult {
        AggregationResult::empty(
            k.resolution,
            AggregationScope::Range {
                start: k.start,
                end: k.end,
            },
        )
    }

    #[tokio::test]
    async fn test_computes_once() {
        let cache = AggregationCache::new(4);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_compute(key(2), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(result_for(key(2)))
                })
                .await
                .unwrap();
            assert_eq!(result.resolution, 6);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = AggregationCache::new(2);
        for day in [2, 3] {
            cache.get_or_compute(key(day), || async move { Ok(result_for(key(day))) }).await.unwrap();
        }
        // Touch day 2 so day 3 becomes the eviction candidate.
        assert!(cache.get(&key(2)).await.is_some());
        cache.get_or_compute(key(4), || async { Ok(result_for(key(4))) }).await.unwrap();

        let stats = cache.stats().await;
        assert_eq!(stats.size, 2);
        assert_eq!(stats.keys, vec![key(4), key(2)]);
        assert!(cache.get(&key(3)).await.is_none());
    }

    #[tokio::test]
    async fn test_partial_and_failed_results_not_cached() {
        let cache = AggregationCache::new(4);

        let partial = cache
            .get_or_compute(key(5), || async {
                let mut r = result_for(key(5));
                r.failed_days.push(august(3));
                Ok(r)
            })
            .await
            .unwrap();
        assert!(!partial.is_complete());

        let err = cache
            .get_or_compute(key(6), || async { Err(GridError::generation("boom")) })
            .await;
        assert!(err.is_err());

        assert_eq!(cache.stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = AggregationCache::new(4);
        cache.get_or_compute(key(2), || async { Ok(result_for(key(2))) }).await.unwrap();
        assert_eq!(cache.clear().await, 1);
        assert_eq!(cache.stats().await.size, 0);
    }
}

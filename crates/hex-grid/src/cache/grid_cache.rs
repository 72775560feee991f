//! Persistent cache of generated grids.
//!
//! Grids are stored as JSON under `grids/res{NN}/{region_key}.json` in any
//! [`CacheStorage`] backend. Storage problems never fail a request: a read
//! or decode failure is a miss, a write failure only loses the cached copy.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use hex_common::{Grid, GridError, GridResult, Region};
use storage::{CacheStorage, StoragePath};

use crate::geometry::parse_resolution;
use crate::indexer::GridIndexer;

/// Version of the persisted grid layout.
pub const GRID_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoredGrid {
    format_version: u32,
    grid: Grid,
}

/// Hit/miss counters.
#[derive(Debug, Default)]
pub struct GridCacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl GridCacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Snapshot of what the cache holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCacheStatus {
    /// Storage keys of cached grids.
    pub keys: Vec<String>,
    /// Bytes stored across all cached grids.
    pub total_size: u64,
    /// Most recent write, `None` when empty.
    pub last_updated: Option<DateTime<Utc>>,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups served from storage.
    pub hit_rate: f64,
}

/// Grid cache over a pluggable byte store.
pub struct GridCache {
    storage: Arc<dyn CacheStorage>,
    indexer: Arc<GridIndexer>,
    precision: u32,
    stats: Arc<GridCacheStats>,
}

impl GridCache {
    /// `precision` is the number of decimals viewport keys are quantized to.
    pub fn new(storage: Arc<dyn CacheStorage>, indexer: Arc<GridIndexer>, precision: u32) -> Self {
        Self {
            storage,
            indexer,
            precision,
            stats: Arc::new(GridCacheStats::default()),
        }
    }

    pub fn indexer(&self) -> &Arc<GridIndexer> {
        &self.indexer
    }

    pub fn stats(&self) -> &GridCacheStats {
        &self.stats
    }

    /// Cache key of `region`.
    pub fn region_key(&self, region: &Region) -> String {
        region.cache_key(self.precision)
    }

    /// Fetch the grid of `region` at `resolution`, generating it on a miss.
    #[instrument(skip(self), fields(storage = %self.storage.describe()))]
    pub async fn get(&self, resolution: u8, region: &Region) -> GridResult<Grid> {
        parse_resolution(resolution)?;
        region.validate()?;

        let region_key = self.region_key(region);
        let path = StoragePath::grid(resolution, &region_key);

        if let Some(grid) = self.load(&path, resolution).await {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %path, cells = grid.len(), "Grid cache hit");
            return Ok(grid);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        // Generate the canonical region so every viewport sharing this key
        // gets the same cells.
        let canonical = region.canonical(self.precision);
        let indexer = Arc::clone(&self.indexer);
        let grid = tokio::task::spawn_blocking(move || indexer.generate(resolution, &canonical))
            .await
            .map_err(|e| GridError::Internal(format!("grid generation task failed: {}", e)))??;

        self.store(&path, &grid).await;
        info!(key = %path, cells = grid.len(), "Grid cache miss, generated");
        Ok(grid)
    }

    async fn load(&self, path: &str, resolution: u8) -> Option<Grid> {
        let bytes = match self.storage.read(path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %path, error = %e, "Grid cache read failed, regenerating");
                return None;
            }
        };

        match serde_json::from_slice::<StoredGrid>(&bytes) {
            Ok(stored) if stored.format_version != GRID_FORMAT_VERSION => {
                warn!(
                    key = %path,
                    version = stored.format_version,
                    "Unknown grid format version, regenerating"
                );
                None
            }
            Ok(stored) if stored.grid.resolution != resolution => {
                warn!(key = %path, "Cached grid has wrong resolution, regenerating");
                None
            }
            Ok(stored) => Some(stored.grid.normalized()),
            Err(e) => {
                warn!(key = %path, error = %e, "Corrupt cached grid, regenerating");
                None
            }
        }
    }

    async fn store(&self, path: &str, grid: &Grid) {
        let stored = StoredGrid {
            format_version: GRID_FORMAT_VERSION,
            grid: grid.clone(),
        };
        let bytes = match serde_json::to_vec(&stored) {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                warn!(key = %path, error = %e, "Failed to encode grid");
                return;
            }
        };

        if let Err(e) = self.storage.write(path, bytes).await {
            warn!(key = %path, error = %e, "Failed to persist grid");
        }
    }

    /// Remove cached grids for one region key (every resolution), or all
    /// grids when `region_key` is `None`. Returns how many were removed.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, region_key: Option<&str>) -> GridResult<usize> {
        let objects = self.storage.list(StoragePath::GRIDS).await?;
        let mut removed = 0;

        for object in objects {
            let matches = match (region_key, StoragePath::parse_grid(&object.key)) {
                (None, _) => true,
                (Some(wanted), Some((_, key))) => key == wanted,
                (Some(_), None) => false,
            };
            if !matches {
                continue;
            }

            match self.storage.delete(&object.key).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(key = %object.key, error = %e, "Failed to delete cached grid"),
            }
        }

        info!(removed, "Invalidated cached grids");
        Ok(removed)
    }

    /// Keys, size and freshness of the cached grids.
    pub async fn status(&self) -> GridResult<GridCacheStatus> {
        let objects = self.storage.list(StoragePath::GRIDS).await?;

        Ok(GridCacheStatus {
            total_size: objects.iter().map(|o| o.size).sum(),
            last_updated: objects.iter().map(|o| o.last_modified).max(),
            keys: objects.into_iter().map(|o| o.key).collect(),
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            hit_rate: self.stats.hit_rate(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::CoverageArea;
    use storage::ObjectStorage;

    fn cache_over(storage: Arc<ObjectStorage>) -> GridCache {
        let indexer = Arc::new(GridIndexer::with_coverage(CoverageArea::mainland_portugal()));
        GridCache::new(storage, indexer, 2)
    }

    #[tokio::test]
    async fn test_second_get_is_a_hit() {
        let storage = Arc::new(ObjectStorage::in_memory());
        let cache = cache_over(storage.clone());
        let region = Region::viewport(-8.5, 39.0, -8.0, 39.5);

        let first = cache.get(6, &region).await.unwrap();
        let second = cache.get(6, &region).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);

        let status = cache.status().await.unwrap();
        assert_eq!((status.hits, status.misses), (1, 1));
        assert!((status.hit_rate - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unsorted_stored_cells_are_normalized() {
        let storage = Arc::new(ObjectStorage::in_memory());
        let cache = cache_over(storage.clone());
        let region = Region::viewport(-8.5, 39.0, -8.0, 39.5);
        let path = StoragePath::grid(6, &cache.region_key(&region));

        let mut grid = cache.indexer().generate(6, &region).unwrap();
        let expected = grid.cells.clone();
        grid.cells.reverse();
        let duplicate = grid.cells[0].clone();
        grid.cells.push(duplicate);
        let stored = StoredGrid {
            format_version: GRID_FORMAT_VERSION,
            grid,
        };
        storage
            .put(&path, Bytes::from(serde_json::to_vec(&stored).unwrap()))
            .await
            .unwrap();

        let loaded = cache.get(6, &region).await.unwrap();
        assert_eq!(cache.stats().hits.load(Ordering::Relaxed), 1);
        assert_eq!(loaded.cells, expected);
        assert!(expected.iter().all(|cell| loaded.contains_cell(&cell.id)));
    }

    #[tokio::test]
    async fn test_unknown_format_version_is_a_miss() {
        let storage = Arc::new(ObjectStorage::in_memory());
        let cache = cache_over(storage.clone());
        let region = Region::viewport(-8.5, 39.0, -8.0, 39.5);
        let path = StoragePath::grid(6, &cache.region_key(&region));

        let stale = serde_json::json!({
            "format_version": 99,
            "grid": Grid::empty(6, region.clone()),
        });
        storage
            .put(&path, Bytes::from(serde_json::to_vec(&stale).unwrap()))
            .await
            .unwrap();

        let grid = cache.get(6, &region).await.unwrap();
        assert!(!grid.is_empty());
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_regenerated() {
        let storage = Arc::new(ObjectStorage::in_memory());
        let cache = cache_over(storage.clone());
        let region = Region::viewport(-8.5, 39.0, -8.0, 39.5);
        let path = StoragePath::grid(6, &cache.region_key(&region));

        storage.put(&path, Bytes::from_static(b"{oops")).await.unwrap();

        let grid = cache.get(6, &region).await.unwrap();
        assert!(!grid.is_empty());

        // The regenerated grid replaced the corrupt entry.
        let stored = storage.get(&path).await.unwrap().unwrap();
        assert!(serde_json::from_slice::<StoredGrid>(&stored).is_ok());
    }

    #[tokio::test]
    async fn test_validation_happens_before_lookup() {
        let cache = cache_over(Arc::new(ObjectStorage::in_memory()));
        assert!(cache.get(16, &Region::Global).await.unwrap_err().is_validation());
        assert!(cache
            .get(6, &Region::viewport(f64::NAN, 39.0, -8.0, 39.5))
            .await
            .unwrap_err()
            .is_validation());
        assert_eq!(cache.stats().misses.load(Ordering::Relaxed), 0);
    }
}

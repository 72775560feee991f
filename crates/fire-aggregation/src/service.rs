//! Facade over grid caching, binning and range aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use hex_common::{
    AggregationResult, AggregationScope, DateRange, FireRecord, Grid, GridError, GridResponse,
    GridResult, Region,
};
use hex_grid::geometry::parse_resolution;
use hex_grid::{GridCache, GridCacheStatus, GridIndexer, HexGridConfig, ResolutionSelector};
use storage::{CacheStorage, RecordStore};

use crate::aggregation_cache::{AggregationCache, AggregationCacheStats, AggregationKey};
use crate::binner::FireBinner;
use crate::config::{AggregationConfig, MergePolicy};

/// Combined status of both caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub grids: GridCacheStatus,
    pub aggregations: AggregationCacheStats,
}

/// What `clear_cache` removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedCaches {
    pub grids: usize,
    pub aggregations: usize,
}

/// Entry point for hosts: grids by resolution or zoom, snapshot and range
/// aggregations, and cache administration.
pub struct FireAggregationService {
    selector: ResolutionSelector,
    grid_cache: Arc<GridCache>,
    aggregations: AggregationCache,
    records: Arc<dyn RecordStore>,
    binner: FireBinner,
    config: AggregationConfig,
}

impl FireAggregationService {
    pub fn new(
        selector: ResolutionSelector,
        grid_cache: Arc<GridCache>,
        records: Arc<dyn RecordStore>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            selector,
            grid_cache,
            aggregations: AggregationCache::new(config.cache_capacity),
            records,
            binner: FireBinner::new(),
            config,
        }
    }

    /// Wire everything from configuration.
    pub fn from_config(
        grid_config: &HexGridConfig,
        config: AggregationConfig,
        storage: Arc<dyn CacheStorage>,
        records: Arc<dyn RecordStore>,
    ) -> GridResult<Self> {
        grid_config
            .validate()
            .map_err(|e| GridError::validation("grid_config", e))?;
        config
            .validate()
            .map_err(|e| GridError::validation("aggregation_config", e))?;

        let selector = ResolutionSelector::new(grid_config.zoom_steps.clone())?;
        let indexer = Arc::new(GridIndexer::from_config(grid_config)?);
        let grid_cache = Arc::new(GridCache::new(
            storage,
            indexer,
            grid_config.region_key_precision,
        ));

        let mut service = Self::new(selector, grid_cache, records, config);
        service.binner = FireBinner::with_mode(grid_config.cover_mode);
        Ok(service)
    }

    pub fn grid_cache(&self) -> &Arc<GridCache> {
        &self.grid_cache
    }

    pub fn selector(&self) -> &ResolutionSelector {
        &self.selector
    }

    /// Grid of `region` at `resolution`.
    pub async fn get_grid(&self, resolution: u8, region: &Region) -> GridResult<GridResponse> {
        let grid = self.grid_cache.get(resolution, region).await?;
        Ok(GridResponse::from(&grid))
    }

    /// Grid of `region` at the resolution for a map zoom level.
    pub async fn get_grid_for_zoom(&self, zoom: f64, region: &Region) -> GridResult<GridResponse> {
        let resolution = self.selector.resolution_for_zoom(zoom);
        self.get_grid(resolution, region).await
    }

    /// Bin caller-supplied records onto `grid`.
    ///
    /// The scope carries a date when every record shares one.
    pub fn aggregate_snapshot(&self, records: &[FireRecord], grid: &Grid) -> AggregationResult {
        let date = records
            .first()
            .map(|r| r.date)
            .filter(|d| records.iter().all(|r| r.date == *d));
        self.binner
            .bin(grid, records, AggregationScope::Snapshot { date })
    }

    /// Records of one day binned onto the grid of `region`.
    #[instrument(skip(self))]
    pub async fn aggregate_day(
        &self,
        date: NaiveDate,
        resolution: u8,
        region: &Region,
    ) -> GridResult<AggregationResult> {
        let grid = self.grid_cache.get(resolution, region).await?;
        let records = self.records.records_for_date(date).await?;
        Ok(self
            .binner
            .bin(&grid, &records, AggregationScope::Snapshot { date: Some(date) }))
    }

    /// Cumulative aggregation over `[start, end]` on the global grid.
    ///
    /// Invalid input is an error. A failure after validation yields a
    /// zero-valued result, which is not cached.
    #[instrument(skip(self))]
    pub async fn aggregate_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        resolution: u8,
    ) -> GridResult<AggregationResult> {
        parse_resolution(resolution)?;
        let range = DateRange::new(start, end)?;
        if range.len_days() > self.config.max_range_days {
            return Err(GridError::InvalidDateRange(format!(
                "{} spans {} days, limit is {}",
                range,
                range.len_days(),
                self.config.max_range_days
            )));
        }

        let key = AggregationKey::new(start, end, resolution);
        let computed = self
            .aggregations
            .get_or_compute(key, || self.compute_range(range, resolution))
            .await;

        match computed {
            Ok(result) => Ok(result.as_ref().clone()),
            Err(e) => {
                warn!(key = %key, error = %e, "Range aggregation failed, returning empty result");
                Ok(AggregationResult::empty(
                    resolution,
                    AggregationScope::Range { start, end },
                ))
            }
        }
    }

    async fn compute_range(&self, range: DateRange, resolution: u8) -> GridResult<AggregationResult> {
        let grid = self.grid_cache.get(resolution, &Region::Global).await?;
        let gathered = self.records.records_for_range(&range).await;
        let records = merge_records(gathered.records, self.config.merge_policy);

        let mut result = self.binner.bin(
            &grid,
            &records,
            AggregationScope::Range {
                start: range.start,
                end: range.end,
            },
        );
        result.failed_days = gathered.failed_days;

        info!(
            range = %range,
            days_read = gathered.days_read,
            failed_days = result.failed_days.len(),
            fires = result.total_fires,
            "Computed range aggregation"
        );
        Ok(result)
    }

    pub async fn cache_status(&self) -> GridResult<CacheStatus> {
        Ok(CacheStatus {
            grids: self.grid_cache.status().await?,
            aggregations: self.aggregations.stats().await,
        })
    }

    /// Remove every cached grid and aggregation.
    pub async fn clear_cache(&self) -> GridResult<ClearedCaches> {
        let aggregations = self.aggregations.clear().await;
        let grids = self.grid_cache.invalidate(None).await?;
        info!(grids, aggregations, "Cleared caches");
        Ok(ClearedCaches {
            grids,
            aggregations,
        })
    }

    /// Remove cached grids of one region key, every resolution.
    pub async fn invalidate_region(&self, region_key: &str) -> GridResult<usize> {
        self.grid_cache.invalidate(Some(region_key)).await
    }
}

/// Apply the range merge policy to records in day order.
pub fn merge_records(records: Vec<FireRecord>, policy: MergePolicy) -> Vec<FireRecord> {
    match policy {
        MergePolicy::KeepAll => records,
        MergePolicy::LatestPerFire => {
            let mut seen = HashSet::new();
            let mut latest: Vec<FireRecord> = records
                .into_iter()
                .rev()
                .filter(|r| seen.insert(r.id.clone()))
                .collect();
            latest.reverse();
            latest
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::dates::august;

    #[test]
    fn test_latest_per_fire_keeps_last_report() {
        let records = vec![
            FireRecord::point("a", [-8.0, 39.5], 5.0, august(1)),
            FireRecord::point("b", [-8.0, 39.6], 7.0, august(1)),
            FireRecord::point("a", [-8.0, 39.5], 12.0, august(2)),
        ];

        let merged = merge_records(records.clone(), MergePolicy::LatestPerFire);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, "b");
        assert_eq!(merged[1].id, "a");
        assert_eq!(merged[1].area_hectares, 12.0);

        assert_eq!(merge_records(records, MergePolicy::KeepAll).len(), 3);
    }
}

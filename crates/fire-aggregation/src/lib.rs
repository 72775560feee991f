//! Fire aggregation over hexagon grids.
//!
//! - [`FireBinner`] attributes fire records to the cells of a grid.
//! - [`AggregationCache`] memoizes date-range aggregations in a bounded LRU.
//! - [`FireAggregationService`] is the facade hosts call: grids by
//!   resolution or zoom, snapshot, daily and range aggregations, cache
//!   status and clearing.

pub mod aggregation_cache;
pub mod binner;
pub mod config;
pub mod service;

pub use aggregation_cache::{AggregationCache, AggregationCacheStats, AggregationKey};
pub use binner::FireBinner;
pub use config::{AggregationConfig, MergePolicy};
pub use service::{merge_records, CacheStatus, ClearedCaches, FireAggregationService};

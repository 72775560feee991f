//! Grid caching.

mod grid_cache;

pub use grid_cache::{GridCache, GridCacheStats, GridCacheStatus, GRID_FORMAT_VERSION};

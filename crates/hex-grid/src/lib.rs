//! Hexagonal grid generation and caching.
//!
//! This crate turns a region (the configured coverage polygon or a viewport
//! clipped against it) into a set of H3 cells at a resolution tier, and
//! caches generated grids in pluggable storage.
//!
//! # Architecture
//!
//! ```text
//! zoom ──► ResolutionSelector ──► resolution
//!                                    │
//! region ──► GridCache ──(miss)──► GridIndexer ──► GenerationStrategy chain
//!               │                                   (tiler, lattice sampling)
//!               ▼
//!          CacheStorage (memory / local / S3)
//! ```

pub mod cache;
pub mod config;
pub mod coverage;
pub mod geometry;
pub mod indexer;
pub mod resolution;
pub mod strategy;

pub use cache::{GridCache, GridCacheStats, GridCacheStatus, GRID_FORMAT_VERSION};
pub use config::{CoverMode, HexGridConfig};
pub use coverage::{CoverageArea, CoverageFile};
pub use indexer::GridIndexer;
pub use resolution::{ResolutionSelector, ZoomStep, DEFAULT_ZOOM_STEPS};
pub use strategy::{
    default_strategies, GenerationStrategy, LatticeSamplingStrategy, TilerStrategy,
};

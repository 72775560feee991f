//! Common types and utilities shared across the fire hexgrid crates.

pub mod aggregate;
pub mod bbox;
pub mod cell;
pub mod error;
pub mod fire;
pub mod time;

pub use aggregate::{AggregationResult, AggregationScope, CellAggregate, SizeClass};
pub use bbox::BoundingBox;
pub use cell::{CellFeature, Grid, GridResponse, HexagonCell, LngLat, Region};
pub use error::{GridError, GridResult};
pub use fire::{FireGeometry, FireRecord};
pub use time::DateRange;

/// Highest H3 resolution tier.
pub const MAX_RESOLUTION: u8 = 15;

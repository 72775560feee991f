//! Polygon-to-cell covering strategies.
//!
//! The indexer tries strategies in order and keeps the first success.

use geo::{BoundingRect, Contains, MultiPolygon, Point};
use h3o::{CellIndex, LatLng, Resolution};
use std::collections::BTreeSet;

use hex_common::{GridError, GridResult};

use crate::config::CoverMode;
use crate::geometry::cover_area;

/// One way of turning an area into the set of cells covering it.
pub trait GenerationStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Cells covering `area` at `resolution`. Must be deterministic.
    fn cover(&self, area: &MultiPolygon, resolution: Resolution) -> GridResult<BTreeSet<CellIndex>>;
}

/// H3 polygon tiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct TilerStrategy {
    mode: CoverMode,
}

impl TilerStrategy {
    pub fn new(mode: CoverMode) -> Self {
        Self { mode }
    }
}

impl GenerationStrategy for TilerStrategy {
    fn name(&self) -> &'static str {
        "h3-tiler"
    }

    fn cover(&self, area: &MultiPolygon, resolution: Resolution) -> GridResult<BTreeSet<CellIndex>> {
        cover_area(area, resolution, self.mode.containment_mode())
    }
}

/// Mean earth degree of latitude in kilometres.
const KM_PER_DEGREE: f64 = 111.32;

/// Samples a lat/lng lattice at half the cell edge length and keeps the
/// cells of points inside the area, plus the cells of every vertex.
#[derive(Debug, Clone, Copy)]
pub struct LatticeSamplingStrategy {
    max_samples: usize,
}

impl LatticeSamplingStrategy {
    pub fn new(max_samples: usize) -> Self {
        Self { max_samples }
    }
}

impl GenerationStrategy for LatticeSamplingStrategy {
    fn name(&self) -> &'static str {
        "lattice-sampling"
    }

    fn cover(&self, area: &MultiPolygon, resolution: Resolution) -> GridResult<BTreeSet<CellIndex>> {
        let mut cells = BTreeSet::new();
        let Some(rect) = area.bounding_rect() else {
            return Ok(cells);
        };

        let lat_step = resolution.edge_length_km() / KM_PER_DEGREE / 2.0;
        let (min, max) = (rect.min(), rect.max());

        // Longitude spacing widens towards the pole nearest the area.
        let widest_lat = min.y.abs().max(max.y.abs()).min(89.0);
        let lng_step = lat_step / widest_lat.to_radians().cos();

        let rows = ((max.y - min.y) / lat_step).ceil() as usize + 1;
        let cols = ((max.x - min.x) / lng_step).ceil() as usize + 1;
        let samples = rows.saturating_mul(cols);
        if samples > self.max_samples {
            return Err(GridError::generation(format!(
                "lattice needs {} samples, limit is {}",
                samples, self.max_samples
            )));
        }

        for row in 0..rows {
            let lat = (min.y + row as f64 * lat_step).min(max.y);
            for col in 0..cols {
                let lng = (min.x + col as f64 * lng_step).min(max.x);
                if area.contains(&Point::new(lng, lat)) {
                    cells.insert(to_cell(lng, lat, resolution)?);
                }
            }
        }

        for polygon in &area.0 {
            for coord in polygon.exterior().coords() {
                cells.insert(to_cell(coord.x, coord.y, resolution)?);
            }
        }

        Ok(cells)
    }
}

fn to_cell(lng: f64, lat: f64, resolution: Resolution) -> GridResult<CellIndex> {
    LatLng::new(lat, lng)
        .map(|ll| ll.to_cell(resolution))
        .map_err(|e| GridError::generation(format!("sample [{}, {}]: {}", lng, lat, e)))
}

/// Default chain: tiler first, lattice sampling as fallback.
pub fn default_strategies(
    mode: CoverMode,
    max_fallback_samples: usize,
) -> Vec<Box<dyn GenerationStrategy>> {
    vec![
        Box::new(TilerStrategy::new(mode)),
        Box::new(LatticeSamplingStrategy::new(max_fallback_samples)),
    ]
}

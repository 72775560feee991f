//! Hexagon cells, grids and the regions they cover.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::GridResult;

/// A `[longitude, latitude]` pair in degrees.
pub type LngLat = [f64; 2];

/// Region key used for the fixed coverage polygon.
pub const GLOBAL_REGION_KEY: &str = "global";

/// A single addressable hexagon at a given resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexagonCell {
    /// H3 index in its canonical hexadecimal form.
    pub id: String,
    /// Closed ring of `[lng, lat]` vertices (first vertex repeated last).
    pub boundary: Vec<LngLat>,
    pub resolution: u8,
}

impl HexagonCell {
    pub fn new(id: impl Into<String>, boundary: Vec<LngLat>, resolution: u8) -> Self {
        Self {
            id: id.into(),
            boundary,
            resolution,
        }
    }

    /// True if the boundary ring is closed and has at least a triangle.
    pub fn is_closed(&self) -> bool {
        self.boundary.len() >= 4 && self.boundary.first() == self.boundary.last()
    }

    /// Mean of the distinct boundary vertices.
    pub fn boundary_centroid(&self) -> Option<LngLat> {
        let vertices = match self.boundary.split_last() {
            Some((last, rest)) if Some(last) == rest.first() => rest,
            _ => &self.boundary[..],
        };
        if vertices.is_empty() {
            return None;
        }
        let n = vertices.len() as f64;
        let (sum_lng, sum_lat) = vertices
            .iter()
            .fold((0.0, 0.0), |(x, y), v| (x + v[0], y + v[1]));
        Some([sum_lng / n, sum_lat / n])
    }
}

/// The area a grid is generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Region {
    /// The configured coverage polygon.
    Global,
    /// An explicit viewport, clipped against the coverage polygon.
    Viewport(BoundingBox),
}

impl Region {
    pub fn viewport(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Region::Viewport(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Reject malformed viewports before any computation.
    pub fn validate(&self) -> GridResult<()> {
        match self {
            Region::Global => Ok(()),
            Region::Viewport(bbox) => bbox.validate(),
        }
    }

    /// Cache key for this region: `global` or a quantized viewport.
    pub fn cache_key(&self, precision: u32) -> String {
        match self {
            Region::Global => GLOBAL_REGION_KEY.to_string(),
            Region::Viewport(bbox) => format!("vp_{}", bbox.cache_key(precision)),
        }
    }

    /// The region actually generated for a cache key.
    ///
    /// Two viewports that share a key must produce the same grid, so the
    /// viewport is snapped to the key's precision before generation.
    pub fn canonical(&self, precision: u32) -> Region {
        match self {
            Region::Global => Region::Global,
            Region::Viewport(bbox) => Region::Viewport(bbox.quantized(precision)),
        }
    }
}

/// A generated hexagon grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub resolution: u8,
    /// Cells sorted by id, ids unique.
    pub cells: Vec<HexagonCell>,
    pub region: Region,
    pub generated_at: DateTime<Utc>,
}

impl Grid {
    /// Build a grid, normalizing the cell list to sorted unique ids.
    pub fn new(resolution: u8, cells: Vec<HexagonCell>, region: Region) -> Self {
        Self {
            resolution,
            cells,
            region,
            generated_at: Utc::now(),
        }
        .normalized()
    }

    /// Sort cells by id and drop duplicate ids.
    ///
    /// Grids decoded from outside sources must go through this before
    /// `contains_cell` can be trusted.
    pub fn normalized(mut self) -> Self {
        self.cells.sort_by(|a, b| a.id.cmp(&b.id));
        self.cells.dedup_by(|a, b| a.id == b.id);
        self
    }

    /// A grid with no cells, for regions outside the covered territory.
    pub fn empty(resolution: u8, region: Region) -> Self {
        Self::new(resolution, Vec::new(), region)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains_cell(&self, id: &str) -> bool {
        self.cells
            .binary_search_by(|c| c.id.as_str().cmp(id))
            .is_ok()
    }
}

/// Cell as exposed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFeature {
    pub id: String,
    pub boundary: Vec<LngLat>,
}

/// Grid payload returned by `get_grid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub resolution: u8,
    pub cells: Vec<CellFeature>,
    pub cell_count: usize,
    pub generated_at: DateTime<Utc>,
    pub region: Region,
}

impl From<&Grid> for GridResponse {
    fn from(grid: &Grid) -> Self {
        Self {
            resolution: grid.resolution,
            cells: grid
                .cells
                .iter()
                .map(|c| CellFeature {
                    id: c.id.clone(),
                    boundary: c.boundary.clone(),
                })
                .collect(),
            cell_count: grid.cells.len(),
            generated_at: grid.generated_at,
            region: grid.region.clone(),
        }
    }
}

impl From<Grid> for GridResponse {
    fn from(grid: Grid) -> Self {
        GridResponse::from(&grid)
    }
}

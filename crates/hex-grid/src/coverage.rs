//! The fixed territory a global grid covers, and region clipping.

use geo::{coord, BooleanOps, BoundingRect, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use hex_common::{BoundingBox, GridError, GridResult, LngLat, Region};

use crate::geometry::rings_to_polygon;

/// Simplified outline of mainland Portugal, `[lng, lat]`.
const MAINLAND_PORTUGAL: [LngLat; 15] = [
    [-8.87, 41.87],
    [-8.20, 42.15],
    [-6.60, 41.95],
    [-6.19, 41.57],
    [-6.95, 40.25],
    [-7.01, 39.67],
    [-7.53, 39.66],
    [-7.02, 38.90],
    [-7.40, 38.20],
    [-7.44, 37.17],
    [-8.90, 36.97],
    [-8.80, 37.95],
    [-9.50, 38.70],
    [-8.95, 39.50],
    [-8.87, 41.87],
];

/// On-disk coverage definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageFile {
    pub name: String,
    /// GeoJSON MultiPolygon coordinates.
    pub polygons: Vec<Vec<Vec<LngLat>>>,
}

/// The covered territory.
#[derive(Debug, Clone)]
pub struct CoverageArea {
    name: String,
    area: MultiPolygon,
    bounds: BoundingBox,
}

impl CoverageArea {
    /// Build from GeoJSON-style polygon rings.
    pub fn from_rings(name: impl Into<String>, polygons: &[Vec<Vec<LngLat>>]) -> GridResult<Self> {
        let polygons = polygons
            .iter()
            .map(|rings| rings_to_polygon(rings))
            .collect::<GridResult<Vec<_>>>()?;
        Self::new(name, MultiPolygon::new(polygons))
    }

    pub fn new(name: impl Into<String>, area: MultiPolygon) -> GridResult<Self> {
        let rect = area
            .bounding_rect()
            .ok_or_else(|| GridError::generation("coverage area is empty"))?;
        Ok(Self {
            name: name.into(),
            area,
            bounds: BoundingBox::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y),
        })
    }

    /// Load a coverage definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridError::validation("coverage_path", format!("{}: {}", path.display(), e))
        })?;
        let file: CoverageFile = serde_json::from_str(&content).map_err(|e| {
            GridError::validation("coverage_path", format!("{}: {}", path.display(), e))
        })?;
        Self::from_rings(file.name, &file.polygons)
    }

    /// Built-in outline of mainland Portugal.
    pub fn mainland_portugal() -> Self {
        let exterior: LineString = MAINLAND_PORTUGAL
            .iter()
            .map(|p| coord! { x: p[0], y: p[1] })
            .collect();

        let (min_x, min_y, max_x, max_y) = MAINLAND_PORTUGAL.iter().fold(
            (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |(a, b, c, d), p| (a.min(p[0]), b.min(p[1]), c.max(p[0]), d.max(p[1])),
        );

        Self {
            name: "mainland-portugal".to_string(),
            area: MultiPolygon::new(vec![Polygon::new(exterior, vec![])]),
            bounds: BoundingBox::new(min_x, min_y, max_x, max_y),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn area(&self) -> &MultiPolygon {
        &self.area
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// The polygon to cover for `region`.
    ///
    /// Viewports are clipped against the coverage; a viewport outside the
    /// territory yields an empty multipolygon.
    pub fn region_area(&self, region: &Region) -> GridResult<MultiPolygon> {
        match region {
            Region::Global => Ok(self.area.clone()),
            Region::Viewport(bbox) => {
                bbox.validate()?;
                if !bbox.intersects(&self.bounds) {
                    debug!(coverage = %self.name, ?bbox, "Viewport outside coverage bounds");
                    return Ok(MultiPolygon::new(Vec::new()));
                }

                let viewport = Rect::new(
                    coord! { x: bbox.min_x, y: bbox.min_y },
                    coord! { x: bbox.max_x, y: bbox.max_y },
                )
                .to_polygon();

                Ok(self.area.intersection(&viewport))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Contains, Point};

    #[test]
    fn test_mainland_portugal_contains_inland_points() {
        let coverage = CoverageArea::mainland_portugal();
        let area = coverage.area();
        assert!(area.contains(&Point::new(-8.0, 39.5)));
        assert!(area.contains(&Point::new(-7.5, 40.5)));
        assert!(area.contains(&Point::new(-7.9, 38.5)));
        assert!(!area.contains(&Point::new(-12.0, 39.0)));
    }

    #[test]
    fn test_viewport_outside_is_empty() {
        let coverage = CoverageArea::mainland_portugal();
        let area = coverage
            .region_area(&Region::viewport(-20.0, 30.0, -15.0, 33.0))
            .unwrap();
        assert!(area.0.is_empty());
    }

    #[test]
    fn test_viewport_is_clipped() {
        let coverage = CoverageArea::mainland_portugal();
        let clipped = coverage
            .region_area(&Region::viewport(-8.5, 39.0, -8.0, 39.5))
            .unwrap();
        let full = coverage.area().unsigned_area();
        let part = clipped.unsigned_area();
        assert!(part > 0.0);
        assert!(part < full);
        // Entirely inside the outline: clip equals the viewport.
        assert!((part - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let coverage = CoverageArea::mainland_portugal();
        let err = coverage
            .region_area(&Region::viewport(-7.0, 40.0, -8.0, 41.0))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coverage.json");
        std::fs::write(
            &path,
            r#"{"name":"square","polygons":[[[[0,0],[1,0],[1,1],[0,1],[0,0]]]]}"#,
        )
        .unwrap();

        let coverage = CoverageArea::from_json_file(&path).unwrap();
        assert_eq!(coverage.name(), "square");
        assert_eq!(coverage.bounds(), BoundingBox::new(0.0, 0.0, 1.0, 1.0));
    }
}

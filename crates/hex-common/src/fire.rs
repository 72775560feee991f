//! Fire records as delivered by the record store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cell::LngLat;

/// Multi-polygon burnt-area perimeter.
///
/// Layout follows GeoJSON `MultiPolygon` coordinates: a list of polygons,
/// each a list of rings (exterior first, then holes), each ring a list of
/// `[lng, lat]` positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireGeometry {
    pub polygons: Vec<Vec<Vec<LngLat>>>,
}

impl FireGeometry {
    /// Single polygon without holes.
    pub fn polygon(exterior: Vec<LngLat>) -> Self {
        Self {
            polygons: vec![vec![exterior]],
        }
    }

    pub fn multi(polygons: Vec<Vec<Vec<LngLat>>>) -> Self {
        Self { polygons }
    }

    /// At least one polygon has an exterior ring with three distinct
    /// positions, and every coordinate is finite.
    pub fn is_usable(&self) -> bool {
        let all_finite = self
            .polygons
            .iter()
            .flatten()
            .flatten()
            .all(|p| p[0].is_finite() && p[1].is_finite());

        all_finite
            && self.polygons.iter().any(|rings| {
                rings.first().is_some_and(|exterior| {
                    let open_len = if exterior.first() == exterior.last() {
                        exterior.len().saturating_sub(1)
                    } else {
                        exterior.len()
                    };
                    open_len >= 3
                })
            })
    }
}

/// One wildfire report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireRecord {
    pub id: String,
    #[serde(default)]
    pub polygon: Option<FireGeometry>,
    /// `[lng, lat]` of the fire's reference point.
    pub centroid: LngLat,
    pub area_hectares: f64,
    pub date: NaiveDate,
}

impl FireRecord {
    /// Point-only record.
    pub fn point(id: impl Into<String>, centroid: LngLat, area_hectares: f64, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            polygon: None,
            centroid,
            area_hectares,
            date,
        }
    }

    pub fn with_polygon(mut self, polygon: FireGeometry) -> Self {
        self.polygon = Some(polygon);
        self
    }

    /// Polygon geometry, if present and usable for binning.
    pub fn usable_polygon(&self) -> Option<&FireGeometry> {
        self.polygon.as_ref().filter(|g| g.is_usable())
    }

    /// Area used for aggregation; negative or non-finite areas count as zero.
    pub fn effective_area(&self) -> f64 {
        if self.area_hectares.is_finite() && self.area_hectares > 0.0 {
            self.area_hectares
        } else {
            0.0
        }
    }
}

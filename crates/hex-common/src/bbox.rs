//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude, matching the `[lng, lat]` order used
/// for every emitted geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a viewport string: "minLng,minLat,maxLng,maxLat"
    pub fn from_viewport_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |p: &str| {
            p.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(p.to_string()))
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Reject boxes that cannot describe a viewport on the globe.
    pub fn validate(&self) -> GridResult<()> {
        let coords = [self.min_x, self.min_y, self.max_x, self.max_y];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(GridError::InvalidBbox(format!(
                "non-finite coordinate in {:?}",
                coords
            )));
        }
        if self.min_x < -180.0 || self.max_x > 180.0 {
            return Err(GridError::InvalidBbox(format!(
                "longitude out of range: {} .. {}",
                self.min_x, self.max_x
            )));
        }
        if self.min_y < -90.0 || self.max_y > 90.0 {
            return Err(GridError::InvalidBbox(format!(
                "latitude out of range: {} .. {}",
                self.min_y, self.max_y
            )));
        }
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(GridError::InvalidBbox(format!(
                "degenerate or inverted box: {},{},{},{}",
                self.min_x, self.min_y, self.max_x, self.max_y
            )));
        }
        Ok(())
    }

    /// Check if this bbox intersects another.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Round every corner to `precision` decimals.
    ///
    /// Viewports that differ by less than the precision share one cache entry.
    /// An axis that would collapse to a single value is snapped outward
    /// instead, so a valid box stays valid.
    pub fn quantized(&self, precision: u32) -> BoundingBox {
        let (min_x, max_x) = quantize_span(self.min_x, self.max_x, precision);
        let (min_y, max_y) = quantize_span(self.min_y, self.max_y, precision);
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Generate a cache key fragment for this bbox, quantized to `precision` decimals.
    pub fn cache_key(&self, precision: u32) -> String {
        let q = self.quantized(precision);
        let p = precision as usize;
        format!(
            "{:.p$}_{:.p$}_{:.p$}_{:.p$}",
            q.min_x,
            q.min_y,
            q.max_x,
            q.max_y,
            p = p
        )
    }
}

fn quantize_span(min: f64, max: f64, precision: u32) -> (f64, f64) {
    let lo = quantize(min, precision, f64::round);
    let hi = quantize(max, precision, f64::round);
    if lo < hi || min >= max {
        (lo, hi)
    } else {
        (
            quantize(min, precision, f64::floor),
            quantize(max, precision, f64::ceil),
        )
    }
}

fn quantize(value: f64, precision: u32, snap: fn(f64) -> f64) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = snap(value * factor) / factor;
    // Avoid "-0.00" and "0.00" producing distinct keys.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid viewport format: {0}. Expected 'minLng,minLat,maxLng,maxLat'")]
    InvalidFormat(String),

    #[error("Invalid number in viewport: {0}")]
    InvalidNumber(String),
}

impl From<BboxParseError> for GridError {
    fn from(err: BboxParseError) -> Self {
        GridError::InvalidBbox(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_viewport() {
        let bbox = BoundingBox::from_viewport_string("-9.5,38.5,-8.9,39.0").unwrap();
        assert_eq!(bbox.min_x, -9.5);
        assert_eq!(bbox.min_y, 38.5);
        assert_eq!(bbox.max_x, -8.9);
        assert_eq!(bbox.max_y, 39.0);
    }

    #[test]
    fn test_intersection() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let c = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));

        let intersection = a.intersection(&b).unwrap();
        assert_eq!(intersection.min_x, 5.0);
        assert_eq!(intersection.max_y, 10.0);
    }

    #[test]
    fn test_cache_key_is_quantized() {
        let a = BoundingBox::new(-9.1234, 38.7001, -9.0001, 38.8049);
        let b = BoundingBox::new(-9.1198, 38.6999, -8.9996, 38.8001);
        assert_eq!(a.cache_key(2), b.cache_key(2));
        assert_eq!(a.cache_key(2), "-9.12_38.70_-9.00_38.80");
    }

    #[test]
    fn test_narrow_axis_is_snapped_outward() {
        let narrow = BoundingBox::new(-8.004, 39.0, -8.001, 39.5);
        let q = narrow.quantized(2);
        assert_eq!((q.min_x, q.max_x), (-8.01, -8.0));
        assert_eq!((q.min_y, q.max_y), (39.0, 39.5));
        assert!(q.validate().is_ok());
        assert_eq!(narrow.cache_key(2), "-8.01_39.00_-8.00_39.50");
    }

    #[test]
    fn test_cache_key_negative_zero() {
        let a = BoundingBox::new(-0.001, 0.0, 1.0, 1.0);
        assert_eq!(a.cache_key(2), "0.00_0.00_1.00_1.00");
    }
}

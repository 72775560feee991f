//! Configuration for grid generation and caching.

use h3o::geom::ContainmentMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::resolution::{ResolutionSelector, ZoomStep, DEFAULT_ZOOM_STEPS};

/// Which cells a polygon covering keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverMode {
    /// Cells whose centroid lies inside the polygon.
    Centroid,
    /// Cells entirely inside the polygon.
    Boundary,
    /// Cells touching the polygon.
    Intersects,
    /// Like `Intersects`, but never empty for a tiny polygon.
    Covers,
}

impl Default for CoverMode {
    fn default() -> Self {
        Self::Covers
    }
}

impl CoverMode {
    /// Parse from string (case-insensitive), falling back to `Covers`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "centroid" => Self::Centroid,
            "boundary" => Self::Boundary,
            "intersects" => Self::Intersects,
            _ => Self::Covers,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Centroid => "centroid",
            Self::Boundary => "boundary",
            Self::Intersects => "intersects",
            Self::Covers => "covers",
        }
    }

    pub fn containment_mode(&self) -> ContainmentMode {
        match self {
            Self::Centroid => ContainmentMode::ContainsCentroid,
            Self::Boundary => ContainmentMode::ContainsBoundary,
            Self::Intersects => ContainmentMode::IntersectsBoundary,
            Self::Covers => ContainmentMode::Covers,
        }
    }
}

/// Configuration for the grid indexer and grid cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexGridConfig {
    /// Zoom to resolution table.
    pub zoom_steps: Vec<ZoomStep>,

    /// Decimal places viewport bboxes are quantized to for cache keys.
    pub region_key_precision: u32,

    /// Cell selection of the primary covering.
    pub cover_mode: CoverMode,

    /// Upper bound on lattice points the fallback strategy may sample.
    pub max_fallback_samples: usize,

    /// JSON coverage polygon; the built-in outline is used when unset.
    pub coverage_path: Option<PathBuf>,
}

impl Default for HexGridConfig {
    fn default() -> Self {
        Self {
            zoom_steps: DEFAULT_ZOOM_STEPS.to_vec(),
            region_key_precision: 2,
            cover_mode: CoverMode::Covers,
            max_fallback_samples: 2_000_000,
            coverage_path: None,
        }
    }
}

impl HexGridConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_ZOOM_STEPS") {
            if let Ok(selector) = ResolutionSelector::parse(&val) {
                config.zoom_steps = selector.steps().to_vec();
            }
        }

        if let Ok(val) = std::env::var("GRID_REGION_KEY_PRECISION") {
            if let Ok(precision) = val.parse() {
                config.region_key_precision = precision;
            }
        }

        if let Ok(val) = std::env::var("GRID_COVER_MODE") {
            config.cover_mode = CoverMode::from_str(&val);
        }

        if let Ok(val) = std::env::var("GRID_MAX_FALLBACK_SAMPLES") {
            if let Ok(samples) = val.parse() {
                config.max_fallback_samples = samples;
            }
        }

        if let Ok(val) = std::env::var("GRID_COVERAGE_PATH") {
            if !val.trim().is_empty() {
                config.coverage_path = Some(PathBuf::from(val));
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        ResolutionSelector::new(self.zoom_steps.clone()).map_err(|e| e.to_string())?;

        if self.region_key_precision > 6 {
            return Err("region_key_precision must be 0-6".to_string());
        }

        if self.max_fallback_samples == 0 {
            return Err("max_fallback_samples must be > 0".to_string());
        }

        Ok(())
    }

    /// Selector built from `zoom_steps`.
    pub fn selector(&self) -> Result<ResolutionSelector, String> {
        ResolutionSelector::new(self.zoom_steps.clone()).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = HexGridConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region_key_precision, 2);
        assert_eq!(config.cover_mode, CoverMode::Covers);
        assert_eq!(config.selector().unwrap().resolution_for_zoom(10.0), 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = HexGridConfig {
            region_key_precision: 9,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = HexGridConfig {
            zoom_steps: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cover_mode_parse() {
        assert_eq!(CoverMode::from_str("CENTROID"), CoverMode::Centroid);
        assert_eq!(CoverMode::from_str("intersects"), CoverMode::Intersects);
        assert_eq!(CoverMode::from_str("bogus"), CoverMode::Covers);
    }
}

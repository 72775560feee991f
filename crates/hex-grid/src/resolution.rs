//! Zoom level to grid resolution mapping.

use serde::{Deserialize, Serialize};

use hex_common::{GridError, GridResult, MAX_RESOLUTION};

/// One step of the zoom table: from `min_zoom` upward, use `resolution`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomStep {
    pub min_zoom: f64,
    pub resolution: u8,
}

impl ZoomStep {
    pub const fn new(min_zoom: f64, resolution: u8) -> Self {
        Self {
            min_zoom,
            resolution,
        }
    }
}

/// Default table: `zoom < 9 → 6`, `zoom >= 9 → 7`.
pub const DEFAULT_ZOOM_STEPS: [ZoomStep; 2] = [ZoomStep::new(0.0, 6), ZoomStep::new(9.0, 7)];

/// Ordered step table evaluated by the highest threshold `<= zoom`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionSelector {
    steps: Vec<ZoomStep>,
}

impl Default for ResolutionSelector {
    fn default() -> Self {
        Self {
            steps: DEFAULT_ZOOM_STEPS.to_vec(),
        }
    }
}

impl ResolutionSelector {
    /// Build a selector; steps are sorted by threshold.
    pub fn new(mut steps: Vec<ZoomStep>) -> GridResult<Self> {
        if steps.is_empty() {
            return Err(GridError::validation("zoom_steps", "at least one step required"));
        }
        if let Some(step) = steps.iter().find(|s| !s.min_zoom.is_finite()) {
            return Err(GridError::validation(
                "zoom_steps",
                format!("non-finite threshold {}", step.min_zoom),
            ));
        }
        if let Some(step) = steps.iter().find(|s| s.resolution > MAX_RESOLUTION) {
            return Err(GridError::InvalidResolution(step.resolution));
        }

        steps.sort_by(|a, b| a.min_zoom.total_cmp(&b.min_zoom));
        if steps.windows(2).any(|w| w[0].min_zoom == w[1].min_zoom) {
            return Err(GridError::validation("zoom_steps", "duplicate zoom threshold"));
        }

        Ok(Self { steps })
    }

    /// Parse "0:6,9:7" style tables.
    pub fn parse(s: &str) -> GridResult<Self> {
        let steps = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| {
                let (zoom, res) = part.split_once(':').ok_or_else(|| {
                    GridError::validation("zoom_steps", format!("expected zoom:resolution, got '{}'", part))
                })?;
                let min_zoom = zoom.trim().parse::<f64>().map_err(|_| {
                    GridError::validation("zoom_steps", format!("invalid zoom '{}'", zoom))
                })?;
                let resolution = res.trim().parse::<u8>().map_err(|_| {
                    GridError::validation("zoom_steps", format!("invalid resolution '{}'", res))
                })?;
                Ok(ZoomStep::new(min_zoom, resolution))
            })
            .collect::<GridResult<Vec<_>>>()?;

        Self::new(steps)
    }

    /// Resolution for a zoom level.
    ///
    /// Zooms below the first threshold (and NaN) use the first step.
    pub fn resolution_for_zoom(&self, zoom: f64) -> u8 {
        self.steps
            .iter()
            .rev()
            .find(|step| step.min_zoom <= zoom)
            .unwrap_or(&self.steps[0])
            .resolution
    }

    pub fn steps(&self) -> &[ZoomStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let selector = ResolutionSelector::default();
        assert_eq!(selector.resolution_for_zoom(0.0), 6);
        assert_eq!(selector.resolution_for_zoom(8.0), 6);
        assert_eq!(selector.resolution_for_zoom(8.99), 6);
        assert_eq!(selector.resolution_for_zoom(9.0), 7);
        assert_eq!(selector.resolution_for_zoom(18.0), 7);
    }

    #[test]
    fn test_total_for_odd_inputs() {
        let selector = ResolutionSelector::default();
        assert_eq!(selector.resolution_for_zoom(-3.0), 6);
        assert_eq!(selector.resolution_for_zoom(f64::NAN), 6);
        assert_eq!(selector.resolution_for_zoom(f64::INFINITY), 7);
    }

    #[test]
    fn test_custom_table_is_sorted() {
        let selector = ResolutionSelector::parse("12:8, 0:5, 7:6").unwrap();
        assert_eq!(selector.steps()[0], ZoomStep::new(0.0, 5));
        assert_eq!(selector.resolution_for_zoom(6.5), 5);
        assert_eq!(selector.resolution_for_zoom(7.0), 6);
        assert_eq!(selector.resolution_for_zoom(13.0), 8);
    }

    #[test]
    fn test_rejects_bad_tables() {
        assert!(ResolutionSelector::new(vec![]).is_err());
        assert!(ResolutionSelector::parse("0:16").is_err());
        assert!(ResolutionSelector::parse("0:6,0:7").is_err());
        assert!(ResolutionSelector::parse("zero:6").is_err());
    }
}

//! Grid generation for a region at a resolution.

use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use hex_common::{Grid, GridError, GridResult, HexagonCell, Region};

use crate::config::HexGridConfig;
use crate::coverage::CoverageArea;
use crate::geometry::{hexagon_cell, parse_resolution};
use crate::strategy::{default_strategies, GenerationStrategy};

/// Produces hexagon grids over the coverage area.
///
/// Generation is CPU-bound and synchronous; async callers should run it on
/// the blocking pool.
pub struct GridIndexer {
    coverage: CoverageArea,
    strategies: Vec<Box<dyn GenerationStrategy>>,
}

impl GridIndexer {
    pub fn new(coverage: CoverageArea, strategies: Vec<Box<dyn GenerationStrategy>>) -> Self {
        Self {
            coverage,
            strategies,
        }
    }

    /// Indexer with the default strategy chain.
    pub fn with_coverage(coverage: CoverageArea) -> Self {
        let defaults = HexGridConfig::default();
        Self::new(
            coverage,
            default_strategies(defaults.cover_mode, defaults.max_fallback_samples),
        )
    }

    /// Build from configuration, loading the coverage file if one is set.
    pub fn from_config(config: &HexGridConfig) -> GridResult<Self> {
        let coverage = match &config.coverage_path {
            Some(path) => CoverageArea::from_json_file(path)?,
            None => CoverageArea::mainland_portugal(),
        };
        info!(
            coverage = coverage.name(),
            cover_mode = config.cover_mode.as_str(),
            "Grid indexer configured"
        );
        Ok(Self::new(
            coverage,
            default_strategies(config.cover_mode, config.max_fallback_samples),
        ))
    }

    pub fn coverage(&self) -> &CoverageArea {
        &self.coverage
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Generate the grid of `region` at `resolution`.
    ///
    /// A region that does not overlap the coverage yields an empty grid.
    #[instrument(skip(self), fields(coverage = self.coverage.name()))]
    pub fn generate(&self, resolution: u8, region: &Region) -> GridResult<Grid> {
        let h3_resolution = parse_resolution(resolution)?;
        region.validate()?;

        let area = self.coverage.region_area(region)?;
        if area.0.is_empty() {
            debug!("Region does not overlap coverage, returning empty grid");
            return Ok(Grid::empty(resolution, region.clone()));
        }

        let start = Instant::now();
        let mut last_error = None;

        for strategy in &self.strategies {
            match strategy.cover(&area, h3_resolution) {
                Ok(cells) => {
                    let cells: Vec<_> = cells.into_iter().collect();
                    let hexagons: Vec<HexagonCell> =
                        cells.par_iter().map(|cell| hexagon_cell(*cell)).collect();

                    info!(
                        strategy = strategy.name(),
                        cells = hexagons.len(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Generated grid"
                    );
                    return Ok(Grid::new(resolution, hexagons, region.clone()));
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Covering strategy failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GridError::generation("no covering strategy configured")))
    }
}

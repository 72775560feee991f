//! Proactive grid generation.
//!
//! Generates the global grid for each configured resolution so the first
//! map request at that resolution is served from the cache.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use fire_aggregation::FireAggregationService;
use hex_common::Region;

/// One grid that is now cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarmedGrid {
    pub resolution: u8,
    pub cells: usize,
}

/// Outcome of one warming pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarmReport {
    pub warmed: Vec<WarmedGrid>,
    pub failed: Vec<(u8, String)>,
    pub elapsed_ms: u64,
}

impl WarmReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Warms global grids through the aggregation service.
pub struct GridWarmer {
    service: Arc<FireAggregationService>,
    resolutions: Vec<u8>,
}

impl GridWarmer {
    pub fn new(service: Arc<FireAggregationService>, resolutions: Vec<u8>) -> Self {
        info!(resolutions = ?resolutions, "Initialized GridWarmer");
        Self {
            service,
            resolutions,
        }
    }

    /// Fetch every configured grid once, generating missing ones.
    pub async fn warm_once(&self) -> WarmReport {
        let start = Instant::now();
        let mut report = WarmReport::default();

        for &resolution in &self.resolutions {
            match self.service.get_grid(resolution, &Region::Global).await {
                Ok(grid) => {
                    info!(resolution, cells = grid.cell_count, "Grid warm");
                    report.warmed.push(WarmedGrid {
                        resolution,
                        cells: grid.cell_count,
                    });
                }
                Err(e) => {
                    warn!(resolution, error = %e, "Failed to warm grid");
                    report.failed.push((resolution, e.to_string()));
                }
            }
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// Warm on a fixed period, forever. Invalidated grids come back on the
    /// next tick.
    pub async fn run_periodic(&self, every: Duration) {
        let mut ticker = interval(every);
        loop {
            ticker.tick().await;
            let report = self.warm_once().await;
            info!(
                warmed = report.warmed.len(),
                failed = report.failed.len(),
                elapsed_ms = report.elapsed_ms,
                "Warming pass complete"
            );
        }
    }
}

//! Grid Warmer
//!
//! Pre-generates global hexagon grids into the configured cache storage and
//! reports the cache status.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use fire_aggregation::{AggregationConfig, FireAggregationService};
use grid_warmer::GridWarmer;
use hex_grid::{geometry::parse_resolution, HexGridConfig};
use storage::{ObjectStorage, ObjectStorageConfig, ObjectStoreRecordStore};

/// Grid Warmer
#[derive(Parser, Debug)]
#[command(name = "grid-warmer")]
#[command(about = "Pre-generate hexagon grids into the grid cache")]
struct Args {
    /// Resolutions to warm
    #[arg(long, value_delimiter = ',', default_value = "6,7", env = "WARM_RESOLUTIONS")]
    resolutions: Vec<u8>,

    /// Drop every cached grid and aggregation before warming
    #[arg(long, env = "WARM_CLEAR_FIRST")]
    clear: bool,

    /// Re-warm every N seconds instead of exiting after one pass
    #[arg(long, env = "WARM_INTERVAL_SECS")]
    interval_secs: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WARM_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting grid warmer");

    for &resolution in &args.resolutions {
        parse_resolution(resolution)?;
    }

    let grid_config = HexGridConfig::from_env();
    let aggregation_config = AggregationConfig::from_env();
    let storage_config = ObjectStorageConfig::from_env();

    let storage = Arc::new(
        ObjectStorage::new(&storage_config).context("Failed to open cache storage")?,
    );
    info!(storage = storage.name(), "Cache storage ready");

    let records = Arc::new(ObjectStoreRecordStore::new(storage.clone()));
    let service = Arc::new(
        FireAggregationService::from_config(&grid_config, aggregation_config, storage, records)
            .context("Invalid configuration")?,
    );

    if args.clear {
        let cleared = service.clear_cache().await?;
        info!(grids = cleared.grids, aggregations = cleared.aggregations, "Cleared caches");
    }

    let warmer = GridWarmer::new(service.clone(), args.resolutions.clone());
    let report = warmer.warm_once().await;

    let status = service.cache_status().await?;
    info!(
        warmed = report.warmed.len(),
        failed = report.failed.len(),
        elapsed_ms = report.elapsed_ms,
        keys = status.grids.keys.len(),
        total_size = status.grids.total_size,
        "Warming complete"
    );
    info!(status = %serde_json::to_string(&status)?, "Cache status");

    if let Some(secs) = args.interval_secs {
        warmer.run_periodic(Duration::from_secs(secs.max(1))).await;
    }

    if !report.is_success() {
        anyhow::bail!("{} grid(s) failed to warm", report.failed.len());
    }
    Ok(())
}

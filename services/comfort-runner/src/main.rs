//! Comfort statistics runner.
//!
//! Runs one region and time window against a local GeoTIFF catalog:
//! - per-product statistics, legends and map layers
//! - optional comfort index
//! - GeoTIFF rasters and a one-row CSV summary written by the local job queue

mod presentation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use export::{Destination, LocalJobQueue};
use geo_common::BoundingBox;
use pipeline::{Pipeline, RunConfig, RunReport};
use raster::GeoTiffCatalog;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "comfort-runner")]
#[command(about = "Regional land surface temperature, vegetation and aerosol statistics")]
struct Args {
    /// Run configuration (YAML). The built-in Kochi run when omitted.
    #[arg(short, long, env = "COMFORT_CONFIG")]
    config: Option<PathBuf>,

    /// GeoTIFF catalog root, overriding the configuration
    #[arg(long)]
    catalog_dir: Option<PathBuf>,

    /// Region bounds "min_lon,min_lat,max_lon,max_lat", overriding the configuration
    #[arg(long)]
    bbox: Option<String>,

    /// Local export directory, overriding the configured destination
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Run date used to resolve rolling windows (default: today, UTC)
    #[arg(long)]
    date: Option<String>,

    /// Directory for map layer and legend images (default: <output>/layers)
    #[arg(long, env = "COMFORT_LAYERS_DIR")]
    layers_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "COMFORT_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "json")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format)?;

    info!("Starting comfort runner");

    let config = load_config(&args)?;
    let today = match &args.date {
        Some(date) => geo_common::time::parse_date(date)
            .with_context(|| format!("invalid --date {:?}", date))?,
        None => Utc::now().date_naive(),
    };
    let layers_dir = layers_dir(&args, &config);

    info!(
        region = %config.region.name,
        window = %config.time.label(),
        products = config.products.len(),
        catalog = ?config.catalog_dir,
        destination = %config.export.destination,
        "Loaded configuration"
    );

    let catalog = Arc::new(GeoTiffCatalog::new(&config.catalog_dir));
    let queue = Arc::new(LocalJobQueue::new());
    let pipeline = Pipeline::new(config, today, catalog, queue.clone())
        .context("invalid run configuration")?;

    let result = pipeline.run().await.context("run failed");

    // Let submitted exports finish before anything can return early
    let summary = queue.drain().await;
    let report = result?;
    let rejected = report.rejected().count();
    info!(
        completed = summary.completed,
        failed = summary.failed,
        rejected,
        "Exports finished"
    );

    let layers_written = match &layers_dir {
        Some(dir) => write_layers(dir, &report).await,
        None => {
            warn!("No local directory for map layers; skipping");
            true
        }
    };

    if summary.failed > 0 || rejected > 0 {
        error!(failed = summary.failed, rejected, "Some exports were not written");
        bail!(
            "{} export(s) failed and {} were rejected",
            summary.failed,
            rejected
        );
    }
    if !layers_written {
        bail!("map layers were not written");
    }
    Ok(())
}

/// Write map layers and legends, logging rather than propagating failure.
async fn write_layers(dir: &Path, report: &RunReport) -> bool {
    match presentation::write_all(dir, report).await {
        Ok(_) => true,
        Err(e) => {
            error!(dir = ?dir, error = %e, "Failed to write map layers");
            false
        }
    }
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

/// Configuration file or built-in default, then environment, then flags.
fn load_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {:?}", path))?,
        None => RunConfig::default_kochi(),
    };
    config
        .apply_env_overrides()
        .context("invalid environment override")?;

    if let Some(dir) = &args.catalog_dir {
        config.catalog_dir = dir.clone();
    }
    if let Some(bbox) = &args.bbox {
        let bbox = BoundingBox::parse(bbox).with_context(|| format!("invalid --bbox {:?}", bbox))?;
        config.region.min_lon = bbox.min_x;
        config.region.min_lat = bbox.min_y;
        config.region.max_lon = bbox.max_x;
        config.region.max_lat = bbox.max_y;
    }
    if let Some(dir) = &args.output_dir {
        config.export.destination = Destination::local(dir);
    }
    Ok(config)
}

fn layers_dir(args: &Args, config: &RunConfig) -> Option<PathBuf> {
    if let Some(dir) = &args.layers_dir {
        return Some(dir.clone());
    }
    match &config.export.destination {
        Destination::Local { dir } => Some(dir.join("layers")),
        Destination::Bucket { .. } => None,
    }
}

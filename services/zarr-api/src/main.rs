//! zarr-api service entry point.
//!
//! Serves registered datasets as Zarr v2 stores over HTTP. Datasets are
//! registered programmatically through the `zarr_api::ZarrApi` builder;
//! the binary ships a `--demo` mode that generates small synthetic
//! datasets so the server can be exercised end to end.

use anyhow::Result;
use clap::Parser;
use dataset_model::{ArrayData, ChunkedArray, Dataset, NdBuffer, Variable};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use zarr_api::{ApiConfig, ZarrApi};

#[derive(Parser, Debug)]
#[command(name = "zarr-api")]
#[command(about = "Serve in-memory datasets as Zarr v2 stores over HTTP")]
struct Args {
    /// Bind address (overrides ZARR_API_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides ZARR_API_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Response cache budget in megabytes (overrides ZARR_API_CACHE_MB)
    #[arg(long)]
    cache_mb: Option<usize>,

    /// Serve generated demo datasets
    #[arg(long)]
    demo: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ApiConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(cache_mb) = args.cache_mb {
        config.cache_size_mb = cache_mb;
    }
    config.validate().map_err(anyhow::Error::msg)?;

    if !args.demo {
        anyhow::bail!(
            "no datasets configured; run with --demo, or embed this service \
             via the zarr_api::ZarrApi builder"
        );
    }

    info!(
        host = %config.host,
        port = config.port,
        cache_mb = config.cache_size_mb,
        "serving demo datasets"
    );

    let api = ZarrApi::new()
        .with_dataset("air", demo_air_dataset()?)
        .with_dataset("counts", demo_counts_dataset()?)
        .with_cache_bytes(config.cache_size_bytes());

    api.serve(&config.host, config.port).await
}

/// Small chunked temperature-like dataset.
fn demo_air_dataset() -> Result<Dataset> {
    let mut dataset = Dataset::new()
        .with_attr("title", "demo air temperature")
        .with_attr("source", "generated");

    let lat = NdBuffer::from_vec(vec![16], (0..16).map(|i| -75.0 + 10.0 * i as f64).collect())?;
    let lon = NdBuffer::from_vec(vec![32], (0..32).map(|i| 11.25 * i as f64).collect())?;
    dataset.add_coord(
        "lat",
        Variable::new(&["lat"], ArrayData::InMemory(lat))?.with_attr("units", "degrees_north"),
    )?;
    dataset.add_coord(
        "lon",
        Variable::new(&["lon"], ArrayData::InMemory(lon))?.with_attr("units", "degrees_east"),
    )?;

    let values: Vec<f32> = (0..16 * 32)
        .map(|i| {
            let (row, col) = (i / 32, i % 32);
            280.0 + (row as f32).sin() * 10.0 + (col as f32).cos() * 5.0
        })
        .collect();
    let buffer = NdBuffer::from_vec(vec![16, 32], values)?;
    let array = ChunkedArray::split(buffer, &[8, 8])?;
    dataset.add_variable(
        "air",
        Variable::new(&["lat", "lon"], ArrayData::Chunked(array))?
            .with_attr("units", "K")
            .with_attr("long_name", "air temperature"),
    )?;

    Ok(dataset)
}

/// Tiny unchunked integer dataset.
fn demo_counts_dataset() -> Result<Dataset> {
    let mut dataset = Dataset::new().with_attr("title", "demo counts");
    let buffer = NdBuffer::from_vec(vec![10], (0..10i64).collect())?;
    dataset.add_variable(
        "counts",
        Variable::new(&["x"], ArrayData::InMemory(buffer))?,
    )?;
    Ok(dataset)
}

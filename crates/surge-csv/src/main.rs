#![doc = include_str!("../README.md")]

mod convert;

use anyhow::Context;
use clap::Parser;
use convert::{ConvertOptions, RowDocument, convert_rows};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Convert a JSON rows document into a CSV file on an elastic worker pool.
#[derive(Debug, Parser)]
#[command(name = "surge-csv", version, about)]
struct CliArgs {
    /// Path of the input JSON document (`{ "rows": [ ... ] }`).
    #[arg(env = "SURGE_CSV_INPUT")]
    input: PathBuf,

    /// Path the CSV output is written to.
    #[arg(env = "SURGE_CSV_OUTPUT")]
    output: PathBuf,

    /// Initial number of pool workers.
    #[arg(long, env = "SURGE_CSV_WORKERS", default_value_t = 10)]
    workers: usize,

    /// Job queue capacity. Defaults to half the row count, floor 1.
    #[arg(long, env = "SURGE_CSV_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let document: RowDocument = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    if document.rows.is_empty() {
        tracing::info!("No rows to convert; nothing written");
        return Ok(());
    }

    let row_count = document.rows.len();
    let options = ConvertOptions {
        workers: args.workers,
        queue_capacity: args
            .queue_capacity
            .unwrap_or_else(|| (row_count / 2).max(1)),
    };
    tracing::info!(
        "Converting {} row(s) with {} worker(s), queue capacity {}",
        row_count,
        options.workers,
        options.queue_capacity
    );

    let csv = convert_rows(document.rows, &options).await?;
    std::fs::write(&args.output, csv)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    tracing::info!("Wrote {} row(s) to {}", row_count, args.output.display());
    Ok(())
}

//! Flight dataset normalizer CLI
//!
//! Reads the raw flight export and writes the normalized dataset consumed by
//! the dashboard.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Parser;
use flight_prep::normalize_file;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "flight-prep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Normalize the raw flight price export for the dashboard", long_about = None)]
struct Args {
    /// Raw CSV export
    #[arg(short, long, default_value = "goibibo_flights_data.csv")]
    input: PathBuf,

    /// Destination for the normalized CSV
    #[arg(short, long, default_value = "goibibo_flights_data_updated.csv")]
    output: PathBuf,

    /// Processing date for Days_To_Departure (YYYY-MM-DD, midnight); defaults to now
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let now: NaiveDateTime = match args.today {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    };

    info!("Flight dataset normalizer v{}", env!("CARGO_PKG_VERSION"));
    info!("Input:  {}", args.input.display());
    info!("Output: {}", args.output.display());

    let summary = normalize_file(&args.input, &args.output, now)
        .with_context(|| format!("Failed to normalize {}", args.input.display()))?;

    if !summary.skipped_columns.is_empty() {
        info!("Skipped derived columns: {}", summary.skipped_columns.join(", "));
    }
    info!("Derived columns: {}", summary.derived_columns.join(", "));
    info!("✓ Normalization completed successfully");

    Ok(())
}

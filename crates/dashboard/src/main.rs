//! Flight price dashboard
//!
//! Key insights about flight prices plus a price predictor backed by a
//! pre-trained log-price model.

mod app;
mod render;
mod shell;

use anyhow::{Context, Result};
use app::{App, PredictRequest};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use flight_core::features::DEFAULT_DURATION_MINUTES;
use flight_core::{DashboardConfig, Session};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "flight-dashboard")]
#[command(about = "Flight price insights and prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Normalized flight dataset
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// Feature layout file
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mean price by airline, class, departure time, season and days to departure
    Insights {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict a ticket price
    Predict {
        #[arg(long)]
        airline: String,

        /// economy or business
        #[arg(long)]
        class: String,

        /// Departure city
        #[arg(long)]
        from: String,

        /// Arrival city
        #[arg(long)]
        to: String,

        /// Flight duration in minutes (30-360, step 10)
        #[arg(long, default_value_t = DEFAULT_DURATION_MINUTES)]
        duration: u32,

        /// Journey date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// List the values accepted by predict
    Options,

    /// Write the dataset-derived feature layout to a file
    Layout {
        #[arg(short, long)]
        output: PathBuf,

        /// List the name of every vector position
        #[arg(long)]
        names: bool,
    },

    /// Print the model's canonical blake3 hash
    ModelHash {
        /// Also write the hash sidecar next to the model
        #[arg(long, conflicts_with = "verify")]
        write: bool,

        /// Check the model against its hash sidecar
        #[arg(long)]
        verify: bool,
    },

    /// Interactive session
    Shell,
}

fn load_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DashboardConfig::default(),
    };
    config.apply_env()?;

    if let Some(path) = &cli.dataset {
        config.data.dataset_path = path.clone();
    }
    if let Some(path) = &cli.model {
        config.model.model_path = path.clone();
    }
    if let Some(path) = &cli.layout {
        config.model.layout_path = Some(path.clone());
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging.level)?;

    info!("Flight price dashboard v{}", flight_core::VERSION);

    let app = App::new(Session::new(config));

    match cli.command {
        Commands::Insights { json } => {
            let text = if json {
                app.insights_json()?
            } else {
                app.insights()?
            };
            println!("{}", text.trim_end());
        }
        Commands::Predict {
            airline,
            class,
            from,
            to,
            duration,
            date,
        } => {
            let request = PredictRequest {
                airline,
                class,
                departure_city: from,
                arrival_city: to,
                duration_minutes: duration,
                journey_date: date,
            };
            println!("{}", app.predict(request, Local::now().date_naive())?);
        }
        Commands::Options => {
            print!("{}", app.options()?);
        }
        Commands::Layout { output, names } => {
            println!("{}", app.export_layout(&output, names)?);
        }
        Commands::ModelHash { write, verify } => {
            println!("{}", app.model_hash(write, verify)?);
        }
        Commands::Shell => {
            app.preload()?;
            let stdin = io::stdin();
            shell::run(&app, stdin.lock(), io::stdout())?;
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use meadow::{
    config::SimulationConfig,
    logging::init_tracing,
    report::{ConsoleReporter, ReportFormat},
    Simulation,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Csv => ReportFormat::Csv,
            Format::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Grain, deer and wolves in monthly lockstep")]
struct Cli {
    /// Path to a YAML config file (stock constants when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the starting year
    #[arg(long)]
    start_year: Option<i32>,

    /// Override the year at which the run stops
    #[arg(long)]
    end_year: Option<i32>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Report line format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Print a CSV header before the first month
    #[arg(long)]
    header: bool,

    /// Log filter, e.g. "info" or "meadow=debug"
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(year) = cli.start_year {
        config.calendar.start_year = year;
    }
    if let Some(year) = cli.end_year {
        config.calendar.end_year = year;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    init_tracing(&config.logging.level);

    let mut reporter = ConsoleReporter::new(cli.format.into());
    if cli.header {
        reporter = reporter.with_header();
    }

    let summary = Simulation::builder(config)
        .with_reporter(reporter)
        .build()
        .context("Invalid simulation settings")?
        .run()?;
    tracing::info!(
        cycles = summary.cycles,
        elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "done"
    );
    Ok(())
}

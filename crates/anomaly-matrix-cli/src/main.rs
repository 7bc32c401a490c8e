//! Anomaly Matrix - build a segment anomaly report
//!
//! Loads a report configuration, fetches forecast-band series for every
//! segment pair from a JSON data file, and prints the resulting matrix of
//! good/bad/net anomaly counts. The matrix is stored as a snapshot and can
//! be reused on the next run while the configuration is unchanged.

use std::path::{Path, PathBuf};

use anomaly_matrix::{JsonFileSnapshot, ReportConfig};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod fixture;
mod output;
mod report;

use fixture::JsonFileProvider;
use output::OutputFormat;
use report::Origin;

/// Anomaly Matrix CLI
#[derive(Parser)]
#[command(name = "anomaly-matrix")]
#[command(about = "Forecast-band anomaly counts across segment pairs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ANOMALY_MATRIX_CONFIG")]
    config: Option<PathBuf>,

    /// Provider data file (JSON keyed by "segment_a|segment_b")
    #[arg(short, long, env = "ANOMALY_MATRIX_DATA")]
    data: PathBuf,

    /// Snapshot path (overrides configuration)
    #[arg(long)]
    snapshot: Option<String>,

    /// Reuse the stored snapshot when the configuration is unchanged
    #[arg(long)]
    reuse_snapshot: bool,

    /// Count weekend anomalies
    #[arg(long)]
    include_weekends: bool,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: OutputFormat,

    /// Log level (overrides configuration)
    #[arg(long, env = "ANOMALY_MATRIX_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "ANOMALY_MATRIX_LOG_JSON")]
    json: bool,
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        ReportConfig::load(cli.config.as_deref()).context("loading report configuration")?;

    // Override with CLI args
    if cli.include_weekends {
        config.include_weekends = true;
    }
    if let Some(path) = cli.snapshot {
        config.snapshot.path = path;
    }
    if cli.reuse_snapshot {
        config.snapshot.reuse = true;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }

    init_tracing(&config.logging.level, config.logging.json);

    let plan = config.plan()?;
    let provider = JsonFileProvider::open(&cli.data, &plan.base)?;
    let store = JsonFileSnapshot::new(Path::new(&config.snapshot.path));

    tracing::info!(
        segments_a = plan.segments_a.len(),
        segments_b = plan.segments_b.len(),
        metrics = plan.metrics.len(),
        pairs_in_data = provider.pairs(),
        "report configured"
    );

    let (matrix, origin) = report::run(&plan, &provider, &store, config.snapshot.reuse).await?;

    if matches!(cli.output, OutputFormat::Table) {
        match origin {
            Origin::Snapshot => output::print_warning(&format!(
                "reused snapshot {} (configuration unchanged)",
                store.path().display()
            )),
            Origin::Built => output::print_info(&format!(
                "built {} cells, snapshot written to {}",
                matrix.len(),
                store.path().display()
            )),
        }
    }

    output::print_matrix(&matrix, cli.output)
}

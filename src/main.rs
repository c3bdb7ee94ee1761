//! Wholesale Trends - command line entry point.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};
use wholesale_trends::{run, PipelineConfig, RunOutcome};

#[derive(Parser)]
#[command(
    name = "wholesale-trends",
    about = "Merge Census wholesale sales and inventories, derive metrics, render charts"
)]
struct Cli {
    /// TOML config file. Missing keys take the standard layout defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root the data/ and charts/ directories live under.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Write the merged CSV only.
    #[arg(long, default_value_t = false)]
    no_charts: bool,
}

fn main() -> Result<ExitCode> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = cli.root {
        config.paths.root = root;
    }
    if cli.no_charts {
        config.charts.enabled = false;
    }

    match run(&config).context("pipeline run failed")? {
        RunOutcome::Completed(report) => {
            println!("\n--- Project Execution Complete ---");
            println!(
                "Merged {} rows into {}",
                report.rows,
                report.merged_path.display()
            );
            for chart in &report.charts {
                println!("Chart: {}", chart.display());
            }
            println!(
                "Next Step: Load '{}' into Tableau.",
                report.merged_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Aborted { empty_inputs } => {
            for path in &empty_inputs {
                eprintln!("No usable rows in {}", path.display());
            }
            eprintln!("Analysis failed: one or both inputs are empty. Nothing was written.");
            Ok(ExitCode::FAILURE)
        }
    }
}

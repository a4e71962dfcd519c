//! Shy Header - headless driver
//!
//! Runs tab and scroll scenarios against the header synchronization engine
//! using simulated scroll views and a virtual clock. Prints a per-step
//! summary (or a JSON report) and exits non-zero when an assertion fails.

mod config;
mod report;
mod runner;
mod scenario;

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::ShyConfig;
use crate::scenario::Scenario;

/// Headless driver for the shy header engine
#[derive(Parser, Debug)]
#[command(name = "shy-header")]
#[command(about = "Run shy header scenarios against simulated tabs")]
#[command(version)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "shy.toml")]
    config: PathBuf,

    /// Scenario JSON file (runs the bundled scenario when omitted)
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Override the number of tabs
    #[arg(long)]
    tabs: Option<usize>,

    /// Override the collapse threshold
    #[arg(long)]
    threshold: Option<f64>,

    /// Override virtual milliseconds per frame
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Print the JSON report instead of the summary
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = ShyConfig::load_or_default(&args.config)?;
    if let Some(tabs) = args.tabs {
        config.page.tabs = tabs;
    }
    if let Some(threshold) = args.threshold {
        config.sync.threshold = threshold;
    }
    if let Some(frame_ms) = args.frame_ms {
        config.page.frame_ms = frame_ms;
    }
    config.validate()?;

    let scenario = match &args.scenario {
        Some(path) => {
            tracing::info!("Loading scenario: {}", path.display());
            Scenario::from_path(path)?
        }
        None => Scenario::bundled()?,
    };

    let report = runner::run(&scenario, &config)?;

    {
        let mut stdout = io::stdout().lock();
        if args.json {
            report.write_to_writer(&mut stdout)?;
        } else {
            report.write_summary(&mut stdout)?;
        }
        stdout.flush()?;
    }
    if let Some(path) = &args.report {
        report.write_to_path(path)?;
        tracing::info!("Report written to {}", path.display());
    }

    if report.is_failed() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

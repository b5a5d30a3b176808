//! parafb daemon entry point

use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use parafb_daemon::cli::Cli;
use parafb_daemon::config::{load_config, log_config_summary};
use parafb_daemon::mirror;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = match cli.verbosity.as_deref() {
        Some(verbosity) => tracing::Level::from_str(verbosity).unwrap_or_else(|_| {
            eprintln!("Unknown log level '{}', using info instead.", verbosity);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("parafb {} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    let config = cli.apply(config);
    log_config_summary(&config);

    Ok(mirror::run(config))
}

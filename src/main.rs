//! Main entry point for the iplookup binary

use anyhow::Context;
use clap::Parser;
use iplookup::cli::Cli;
use iplookup::AppConfig;
use log::info;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    info!("Starting iplookup v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Execute CLI logic
    let code = cli.run(config).await.context("iplookup failed")?;
    Ok(code)
}

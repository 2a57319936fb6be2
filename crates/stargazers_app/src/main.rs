mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use engine_logging::LogDestination;

use crate::cli::Cli;
use crate::config::AppConfig;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path).context("failed to load configuration")?,
        None => AppConfig::default(),
    }
    .with_overrides(&cli);

    let destination = match &config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Stderr,
    };
    engine_logging::initialize(destination, cli.log_level());

    let completed = app::run_app(&cli, &config)?;
    Ok(if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

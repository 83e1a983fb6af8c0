#![doc = include_str!("../README.md")]

mod cli;

use anyhow::bail;
use clap::Parser;
use cli::config::{CliArgs, RunConfig};
use cli::run::process;
use cli::telemetry::init_telemetry;
use urnid::RestRegistrar;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let registrar = RestRegistrar::new(config.client.clone())?;
    let report = process(&config, registrar)?;

    if !report.is_success() {
        bail!("{report}");
    }
    println!("{report}");
    Ok(())
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!(
            process_id = config.generator.process_id,
            "Assigning identifiers in {} with config: {:#?}",
            config.input.display(),
            config.walk
        );
    } else {
        tracing::info!(
            process_id = config.generator.process_id,
            "Assigning identifiers in {} using {} under {}",
            config.input.display(),
            config.generator.method,
            config.assign.namespace
        );
    }
}

//! appsettings CLI Binary
//!
//! Composes the default configuration sources for a directory and prints the
//! result.

use anyhow::Context;
use appsettings::cli::{map_error, Cli, Commands, RunContext};
use appsettings::config::ConfigurationBuilder;
use appsettings::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let logging_config = build_logging_config(cli);
    init_logging(&logging_config).context("Failed to initialize logging")?;
    info!("appsettings starting");

    let context = RunContext::new(cli)
        .map_err(|e| anyhow::anyhow!(map_error(&e)))
        .with_context(|| format!("Failed to compose configuration for {}", cli.dir.display()))?;

    match &cli.command {
        Commands::Watch { key, .. } => context
            .watch(key.as_deref(), |output| println!("{}\n", output))
            .map_err(|e| {
                error!("Watch failed: {}", e);
                anyhow::anyhow!(map_error(&e))
            }),
        command => {
            let output = context.execute(command).map_err(|e| {
                error!("Command failed: {}", e);
                anyhow::anyhow!(map_error(&e))
            })?;
            println!("{}", output);
            Ok(())
        }
    }
}

/// Build logging configuration from CLI args and the composed `logging` section.
/// Precedence: CLI flags override configuration override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = load_logging_section(cli).unwrap_or_default();

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}

/// The `logging` section of the composed configuration, read once without
/// watching. Composition errors surface later, once logging is up.
fn load_logging_section(cli: &Cli) -> Option<LoggingConfig> {
    let mut builder = ConfigurationBuilder::new();
    builder
        .set_base_path(&cli.dir)
        .add_default(cli.secrets_id.as_deref(), cli.command.forwarded_args(), false)
        .ok()?;
    builder.build().ok()?.try_get("logging").ok().flatten()
}

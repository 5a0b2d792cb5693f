//! # rowguard CLI entry point
//!
//! Resolves configuration (defaults, TOML file, environment, flags),
//! installs logging and dispatches to the subcommand handler.

use std::process::ExitCode;

use clap::Parser;

use rowguard::cli::{run_schema, run_validate, Cli, Commands, EXIT_FAILURE, EXIT_VALID};
use rowguard::config::{Config, SystemEnvProvider};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    rowguard::logging::init(&config.logging, cli.verbose);
    tracing::debug!(config = ?config, "configuration resolved");

    let result = match &cli.command {
        Commands::Validate(args) => run_validate(args, &config),
        Commands::Schema => run_schema(&config, std::io::stdout().lock()),
        Commands::Serve(_) => run_serve(config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref(), &SystemEnvProvider)?;
    cli.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

fn run_serve(config: Config) -> anyhow::Result<u8> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(rowguard::server::serve(config))?;
    Ok(EXIT_VALID)
}

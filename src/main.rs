// MD2Note - Markdown to Apple Notes and Google Docs exporter
// Copyright (c) 2025 MD2Note Contributors
// Licensed under the MIT License

use clap::Parser;
use md2note::cli::{Cli, Commands};
use md2note::config::{load_config_or_default, LoggingConfig, Md2NoteConfig, DEFAULT_CONFIG_PATH};
use md2note::logging::init_logging;
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // A config that fails to load is reported after logging is up
    let loaded = load_config_or_default(cli.config.as_deref());

    let (log_level, logging_config) = match &loaded {
        Ok(config) => (
            cli.log_level
                .clone()
                .unwrap_or_else(|| config.application.log_level.clone()),
            config.logging.clone(),
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            LoggingConfig::default(),
        ),
    };

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(2);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "MD2Note - Markdown to Apple Notes and Google Docs exporter"
    );

    let exit_code = match execute_command(&cli, loaded).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush the file log before exiting
    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(
    cli: &Cli,
    loaded: md2note::domain::Result<Md2NoteConfig>,
) -> anyhow::Result<i32> {
    if let Commands::ValidateConfig(args) = &cli.command {
        let path = cli
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        return args.execute(&path).await;
    }

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            eprintln!("Failed to load configuration: {e}");
            return Ok(2); // Configuration error exit code
        }
    };

    match &cli.command {
        Commands::Export(args) => args.execute(&config).await,
        Commands::Login(args) => args.execute(&config).await,
        Commands::ValidateConfig(_) => Ok(0),
    }
}

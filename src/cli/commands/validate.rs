//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the MD2Note configuration file.

use crate::config::{load_config, DestinationKind, ExporterConfig, Organization};
use clap::Args;
use std::path::Path;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &Path) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path.display(), "Validating configuration");

        println!("Validating configuration file: {}", config_path.display());
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = config.validate() {
            println!("Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        let exporter_config = match ExporterConfig::from_config(&config) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match &config.source.root {
            Some(root) => {
                println!("  Source: {}", root.display());
                println!("  Clean directory: {}", config.source.clean_dir_for(root).display());
            }
            None => println!("  Source: <given on the command line>"),
        }
        println!("  Extensions: {}", config.source.extensions.join(", "));
        println!("  Destination: {}", exporter_config.destination_kind());
        match exporter_config.organization() {
            Organization::Default => println!("  Folder: <destination default>"),
            Organization::Named(name) => println!("  Folder: {name}"),
            Organization::AutoGenerate => println!(
                "  Folder: auto-generated ({})",
                exporter_config.auto_folder_pattern()
            ),
        }
        println!("  File Info: {}", exporter_config.include_file_info());

        match exporter_config.destination_kind() {
            DestinationKind::Notes => {
                let notes = exporter_config.notes();
                println!(
                    "  Notes Account: {}",
                    notes.account.as_deref().unwrap_or("<default>")
                );
                println!("  osascript: {}", notes.osascript_path.display());
            }
            DestinationKind::CloudDoc => {
                if let Some(credentials) = exporter_config.credentials() {
                    println!(
                        "  Client Secrets: {}",
                        credentials.credentials_path.display()
                    );
                    println!("  Token Store: {}", credentials.token_store_path.display());
                }
                println!("  Request Timeout: {}s", exporter_config.clouddoc().timeout_seconds);
            }
        }
        println!();
        Ok(0)
    }
}

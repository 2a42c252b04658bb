//! Export command implementation
//!
//! This module implements the `export` command, which exports every
//! Markdown file of a source tree and archives the exported ones.

use crate::cli::exit_code_for;
use crate::config::{DestinationKind, Md2NoteConfig};
use crate::core::export::{run, RunSummary};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Directory containing the Markdown files (default: source.root)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory exported files are moved to (default: <source>/clean)
    #[arg(long)]
    pub clean: Option<PathBuf>,

    /// Destination: notes or clouddoc
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Folder to export into, created when missing
    #[arg(long, conflicts_with = "auto_folder")]
    pub folder: Option<String>,

    /// Export into a new timestamped folder
    #[arg(long)]
    pub auto_folder: bool,

    /// Do not append the File Info section
    #[arg(long)]
    pub no_file_info: bool,

    /// OAuth client secrets file for Google Docs
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Token cache file for Google Docs
    #[arg(long)]
    pub token_store: Option<PathBuf>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl ExportArgs {
    /// Applies command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Md2NoteConfig) {
        if let Some(source) = &self.source {
            config.source.root = Some(source.clone());
        }
        if let Some(clean) = &self.clean {
            config.source.clean = Some(clean.clone());
        }
        if let Some(destination) = &self.destination {
            tracing::info!(destination = %destination, "Overriding destination from CLI");
            config.destination.kind = destination.clone();
        }
        if let Some(folder) = &self.folder {
            config.destination.folder = Some(folder.clone());
            config.destination.auto_folder = false;
        }
        if self.auto_folder {
            config.destination.folder = None;
            config.destination.auto_folder = true;
        }
        if self.no_file_info {
            config.destination.include_file_info = false;
        }
        if let Some(credentials) = &self.credentials {
            config.clouddoc.credentials_path = credentials.clone();
        }
        if let Some(token_store) = &self.token_store {
            config.clouddoc.token_store_path = Some(token_store.clone());
        }
    }

    /// Execute the export command
    pub async fn execute(&self, config: &Md2NoteConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = config.clone();
        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let Some(source) = config.source.root.clone() else {
            eprintln!("No source directory given. Use --source or set source.root");
            return Ok(2);
        };
        let clean = config.source.clean_dir_for(&source);

        if !self.yes {
            println!("Export Configuration:");
            println!("  Source: {}", source.display());
            println!("  Clean directory: {}", clean.display());
            println!("  Destination: {}", destination_label(&config));
            println!(
                "  Folder: {}",
                match (&config.destination.folder, config.destination.auto_folder) {
                    (Some(folder), _) => folder.clone(),
                    (None, true) => "auto-generated".to_string(),
                    (None, false) => "default".to_string(),
                }
            );
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        println!("Starting export...");
        println!();

        let summary = match run(&source, &config).await {
            Ok(summary) => summary,
            Err(e) => {
                crate::log_error_with_context!(&e, "Export could not start");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        print_summary(&summary);
        Ok(summary.exit_code())
    }
}

fn destination_label(config: &Md2NoteConfig) -> String {
    match config.destination.kind.parse::<DestinationKind>() {
        Ok(DestinationKind::Notes) => "Apple Notes".to_string(),
        Ok(DestinationKind::CloudDoc) => "Google Docs".to_string(),
        Err(_) => config.destination.kind.clone(),
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Export Summary:");
    println!("  Total Files: {}", summary.total_attempted);
    println!("  Successful: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if !summary.failures.is_empty() {
        println!("Failures:");
        for failure in &summary.failures {
            println!(
                "  - {} [{}]",
                failure.source_path().display(),
                failure.error_kind().map(|k| k.as_str()).unwrap_or("Unknown")
            );
            if let Some(detail) = failure.error_detail() {
                println!("    {detail}");
            }
        }
        println!();
        println!("Export completed with failures");
    } else {
        println!("Export completed successfully!");
    }
}

//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for MD2Note using clap.

pub mod commands;

use crate::domain::Md2NoteError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MD2Note - export Markdown notes to Apple Notes or Google Docs
#[derive(Parser, Debug)]
#[command(name = "md2note")]
#[command(version, about, long_about = None)]
#[command(author = "MD2Note Contributors")]
pub struct Cli {
    /// Path to configuration file (default: ./md2note.toml when present)
    #[arg(short, long, env = "MD2NOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MD2NOTE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export Markdown files and archive the exported ones
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Sign in to Google and store the token for Google Docs export
    Login(commands::login::LoginArgs),
}

/// Process exit code for a fatal error
///
/// 2: configuration, 3: source directory, 4: authentication setup,
/// 5: anything else.
pub fn exit_code_for(error: &Md2NoteError) -> i32 {
    match error {
        Md2NoteError::Configuration(_)
        | Md2NoteError::Validation(_)
        | Md2NoteError::UnsupportedDestination(_) => 2,
        Md2NoteError::DirectoryNotFound(_) | Md2NoteError::PermissionDenied(_) => 3,
        Md2NoteError::Authentication(_) => 4,
        _ => 5,
    }
}

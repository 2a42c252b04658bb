// MD2Note - Markdown to Apple Notes and Google Docs exporter
// Copyright (c) 2025 MD2Note Contributors
// Licensed under the MIT License

//! # MD2Note - Markdown to Apple Notes and Google Docs
//!
//! MD2Note exports a directory tree of Markdown notes into Apple Notes or
//! Google Docs, one document per file, and moves every exported file into a
//! "clean" directory so that a rerun only picks up what is left.
//!
//! ## Overview
//!
//! For each Markdown file the pipeline:
//! - **Scans** the source tree, skipping hidden entries and the clean tree
//! - **Extracts** a metadata record from YAML front matter and the body
//! - **Exports** the record to the configured destination, skipping documents
//!   that already exist
//! - **Moves** the exported file into the clean tree, mirroring its relative path
//!
//! One file failing never stops the run; every failure is recorded in the
//! [`RunSummary`](core::export::RunSummary) with its error kind.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline (scan, metadata, transform, export, mover)
//! - [`adapters`] - Destinations (Apple Notes, Google Docs)
//! - [`domain`] - Records, outcomes and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2note::config::load_config_or_default;
//! use md2note::core::export::run;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default(None)?;
//!     let summary = run(Path::new("notes"), &config).await?;
//!
//!     println!("Exported {} of {} files", summary.succeeded, summary.total_attempted);
//!     std::process::exit(summary.exit_code());
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::Md2NoteError`]. Run-setup errors are fatal:
//!
//! ```rust,no_run
//! use md2note::domain::Md2NoteError;
//!
//! let error = Md2NoteError::DirectoryNotFound("notes".to_string());
//! assert!(error.is_fatal());
//! assert!(Md2NoteError::Authentication("expired".to_string()).kind().is_some());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

//! Configuration management for MD2Note.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation, plus the run-level [`ExporterConfig`] derived from it.
//!
//! # Overview
//!
//! MD2Note runs without a configuration file. When one is present it supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `MD2NOTE_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use md2note::config::{load_config, ExporterConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("md2note.toml")?;
//! let exporter_config = ExporterConfig::from_config(&config)?;
//! println!("Destination: {}", exporter_config.destination_kind());
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! root = "/Users/me/notes"
//!
//! [destination]
//! kind = "clouddoc"
//! folder = "Imported Notes"
//!
//! [clouddoc]
//! credentials_path = "${HOME}/.md2note/credentials.json"
//! ```

pub mod exporter;
pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use exporter::{CredentialsRef, DestinationKind, ExporterConfig, Organization};
pub use loader::{load_config, load_config_or_default, DEFAULT_CONFIG_PATH};
pub use schema::{
    ApplicationConfig, CloudDocConfig, DestinationConfig, LoggingConfig, Md2NoteConfig,
    NotesConfig, SourceConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};

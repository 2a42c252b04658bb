//! Destination integrations for MD2Note.
//!
//! - [`exporter`] - The [`Exporter`](exporter::Exporter) trait and the factory
//!   that selects a destination from configuration
//! - [`notes`] - Apple Notes through the AppleScript bridge
//! - [`clouddoc`] - Google Docs stored in Google Drive, with OAuth sign-in
//!
//! Each destination talks to the outside world through a narrow trait
//! ([`NotesBridge`](notes::NotesBridge), [`DocsApi`](clouddoc::DocsApi),
//! [`TokenStore`](clouddoc::TokenStore)) with an in-memory implementation
//! for tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use md2note::adapters::exporter::create_exporter;
//! use md2note::config::{DestinationKind, ExporterConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExporterConfig::new(DestinationKind::Notes, Some("Imported".to_string()), false)?;
//! let exporter = create_exporter(&config)?;
//! exporter.preflight().await?;
//! # Ok(())
//! # }
//! ```

pub mod clouddoc;
pub mod exporter;
pub mod notes;

//! Exporter factory
//!
//! This module provides factory functions to create the exporter for a run
//! based on configuration.

use super::traits::Exporter;
use crate::adapters::clouddoc::api::{build_http_client, DocsHttpClient};
use crate::adapters::clouddoc::auth::OAuthSessionProvider;
use crate::adapters::clouddoc::exporter::CloudDocExporter;
use crate::adapters::clouddoc::token_store::{FileTokenStore, TokenStore};
use crate::adapters::notes::bridge::{NotesBridge, OsaScriptBridge};
use crate::adapters::notes::exporter::NotesExporter;
use crate::config::{DestinationKind, ExporterConfig, Organization};
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::sync::Arc;

/// Create the exporter selected by the configuration
///
/// CloudDoc exporters read tokens from the file store at
/// `credentials.token_store_path` and do not authenticate until the first
/// export.
///
/// # Errors
///
/// Returns an error if the auto-folder pattern is invalid or the HTTP client
/// cannot be built.
pub fn create_exporter(config: &ExporterConfig) -> Result<Arc<dyn Exporter + Send + Sync>> {
    match config.destination_kind() {
        DestinationKind::Notes => {
            let notes = config.notes();
            let bridge = Arc::new(OsaScriptBridge::new(
                notes.osascript_path.clone(),
                notes.account.clone(),
            ));
            create_notes_exporter(config, bridge)
        }
        DestinationKind::CloudDoc => {
            let credentials = credentials(config)?;
            let store = Arc::new(FileTokenStore::new(credentials.token_store_path.clone()));
            create_exporter_with_token_store(config, store)
        }
    }
}

/// Create the exporter with an injected token store
///
/// The store is only used by the CloudDoc destination.
///
/// # Errors
///
/// See [`create_exporter`].
pub fn create_exporter_with_token_store(
    config: &ExporterConfig,
    token_store: Arc<dyn TokenStore>,
) -> Result<Arc<dyn Exporter + Send + Sync>> {
    if config.destination_kind() == DestinationKind::Notes {
        return create_exporter(config);
    }

    let credentials = credentials(config)?;
    let clouddoc = config.clouddoc();
    let folder = resolve_folder_name(config, Local::now())?;

    tracing::info!(
        folder = folder.as_deref().unwrap_or("<drive root>"),
        "Creating Google Docs exporter"
    );

    let http = build_http_client(clouddoc.timeout_seconds)?;
    let api = DocsHttpClient::with_client(
        http.clone(),
        &clouddoc.docs_base_url,
        &clouddoc.drive_base_url,
    );
    let sessions = OAuthSessionProvider::new(token_store, credentials.credentials_path.clone(), http);
    let exporter = CloudDocExporter::new(
        Arc::new(api),
        Arc::new(sessions),
        folder,
        config.include_file_info(),
    );

    Ok(Arc::new(exporter) as Arc<dyn Exporter + Send + Sync>)
}

/// Create a Notes exporter over an injected bridge
///
/// # Errors
///
/// Returns an error if the auto-folder pattern is invalid.
pub fn create_notes_exporter(
    config: &ExporterConfig,
    bridge: Arc<dyn NotesBridge>,
) -> Result<Arc<dyn Exporter + Send + Sync>> {
    let folder = resolve_folder_name(config, Local::now())?
        .unwrap_or_else(|| config.notes().default_folder.clone());

    tracing::info!(folder = %folder, "Creating Apple Notes exporter");

    let exporter = NotesExporter::new(bridge, folder, config.include_file_info());
    Ok(Arc::new(exporter) as Arc<dyn Exporter + Send + Sync>)
}

/// Folder every document of the run is placed in
///
/// `None` means the destination's default location. Auto-generated names
/// are formatted from `now` with the configured strftime pattern.
///
/// # Errors
///
/// Returns [`Md2NoteError::Configuration`] for an invalid pattern.
pub fn resolve_folder_name(config: &ExporterConfig, now: DateTime<Local>) -> Result<Option<String>> {
    match config.organization() {
        Organization::Default => Ok(None),
        Organization::Named(name) => Ok(Some(name.clone())),
        Organization::AutoGenerate => {
            let mut name = String::new();
            write!(name, "{}", now.format(config.auto_folder_pattern())).map_err(|_| {
                Md2NoteError::Configuration(format!(
                    "Invalid auto folder pattern '{}'",
                    config.auto_folder_pattern()
                ))
            })?;
            Ok(Some(name))
        }
    }
}

fn credentials(config: &ExporterConfig) -> Result<&crate::config::CredentialsRef> {
    config.credentials().ok_or_else(|| {
        Md2NoteError::Configuration("Google Docs export requires credentials".to_string())
    })
}

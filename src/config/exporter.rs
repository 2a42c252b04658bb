//! Exporter configuration
//!
//! [`ExporterConfig`] is the run-level, validated view of the destination
//! settings that the exporter factory consumes. It is built once at process
//! start from the TOML configuration plus CLI flags.

use super::schema::{CloudDocConfig, Md2NoteConfig, NotesConfig};
use crate::domain::errors::Md2NoteError;
use crate::domain::result::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Destination the run exports to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Apple Notes via the scripting bridge
    Notes,
    /// Google Docs stored in Google Drive
    CloudDoc,
}

impl FromStr for DestinationKind {
    type Err = Md2NoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "notes" | "apple_notes" => Ok(DestinationKind::Notes),
            "clouddoc" | "google_docs" => Ok(DestinationKind::CloudDoc),
            other => Err(Md2NoteError::UnsupportedDestination(format!(
                "'{other}' (expected notes or clouddoc)"
            ))),
        }
    }
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationKind::Notes => write!(f, "notes"),
            DestinationKind::CloudDoc => write!(f, "clouddoc"),
        }
    }
}

/// Where exported documents are placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Organization {
    /// Destination default location
    Default,
    /// Named folder, created on demand
    Named(String),
    /// Unique folder generated once per run
    AutoGenerate,
}

/// Location of the OAuth client secrets and the token cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsRef {
    pub credentials_path: PathBuf,
    pub token_store_path: PathBuf,
}

/// Validated destination configuration for one run
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    destination_kind: DestinationKind,
    organization: Organization,
    credentials: Option<CredentialsRef>,
    auto_folder_pattern: String,
    include_file_info: bool,
    notes: NotesConfig,
    clouddoc: CloudDocConfig,
}

impl ExporterConfig {
    /// Creates a configuration with default destination settings
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::Validation`] when both a target folder and
    /// auto-generation are requested, or when the target folder is blank.
    pub fn new(
        destination_kind: DestinationKind,
        organization_target: Option<String>,
        auto_generate: bool,
    ) -> Result<Self> {
        let organization = match (organization_target, auto_generate) {
            (Some(_), true) => {
                return Err(Md2NoteError::Validation(
                    "A target folder and an auto-generated folder cannot both be set".to_string(),
                ))
            }
            (Some(target), false) if target.trim().is_empty() => {
                return Err(Md2NoteError::Validation(
                    "Target folder name cannot be empty".to_string(),
                ))
            }
            (Some(target), false) => Organization::Named(target),
            (None, true) => Organization::AutoGenerate,
            (None, false) => Organization::Default,
        };

        let clouddoc = CloudDocConfig::default();
        let credentials = match destination_kind {
            DestinationKind::CloudDoc => Some(CredentialsRef {
                credentials_path: clouddoc.credentials_path.clone(),
                token_store_path: clouddoc.resolved_token_store_path(),
            }),
            DestinationKind::Notes => None,
        };

        Ok(Self {
            destination_kind,
            organization,
            credentials,
            auto_folder_pattern: super::schema::DestinationConfig::default().auto_folder_pattern,
            include_file_info: true,
            notes: NotesConfig::default(),
            clouddoc,
        })
    }

    /// Builds the run configuration from the loaded file configuration
    ///
    /// # Errors
    ///
    /// Returns [`Md2NoteError::UnsupportedDestination`] for an unknown
    /// destination selector and [`Md2NoteError::Validation`] for conflicting
    /// placement options.
    pub fn from_config(config: &Md2NoteConfig) -> Result<Self> {
        let kind: DestinationKind = config.destination.kind.parse()?;
        let exporter_config = Self::new(
            kind,
            config.destination.folder.clone(),
            config.destination.auto_folder,
        )?
        .with_auto_folder_pattern(config.destination.auto_folder_pattern.clone())
        .with_file_info(config.destination.include_file_info)
        .with_notes(config.notes.clone())
        .with_clouddoc(config.clouddoc.clone());

        Ok(exporter_config)
    }

    pub fn with_notes(mut self, notes: NotesConfig) -> Self {
        self.notes = notes;
        self
    }

    /// Replaces the cloud settings and re-derives the credentials reference
    pub fn with_clouddoc(mut self, clouddoc: CloudDocConfig) -> Self {
        if self.destination_kind == DestinationKind::CloudDoc {
            self.credentials = Some(CredentialsRef {
                credentials_path: clouddoc.credentials_path.clone(),
                token_store_path: clouddoc.resolved_token_store_path(),
            });
        }
        self.clouddoc = clouddoc;
        self
    }

    pub fn with_auto_folder_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.auto_folder_pattern = pattern.into();
        self
    }

    pub fn with_file_info(mut self, include: bool) -> Self {
        self.include_file_info = include;
        self
    }

    pub fn destination_kind(&self) -> DestinationKind {
        self.destination_kind
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    /// Only set for destinations that authenticate
    pub fn credentials(&self) -> Option<&CredentialsRef> {
        self.credentials.as_ref()
    }

    pub fn auto_folder_pattern(&self) -> &str {
        &self.auto_folder_pattern
    }

    pub fn include_file_info(&self) -> bool {
        self.include_file_info
    }

    pub fn notes(&self) -> &NotesConfig {
        &self.notes
    }

    pub fn clouddoc(&self) -> &CloudDocConfig {
        &self.clouddoc
    }
}

//! Domain error types
//!
//! This module defines the error hierarchy for MD2Note. Run-setup errors
//! (configuration, source directory, unsupported destination) are fatal and
//! propagate to the caller. Every other variant is a per-file failure that the
//! export pipeline converts into an [`ExportOutcome`](super::ExportOutcome)
//! through [`Md2NoteError::kind`].

use super::outcome::ErrorKind;
use thiserror::Error;

/// Main MD2Note error type
#[derive(Debug, Error)]
pub enum Md2NoteError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid input (bad record, conflicting options)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Destination rejected credentials or no session could be established
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Destination unreachable or request failed recoverably
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// Destination-specific validation failure (bad folder, rejected request)
    #[error("Destination rejected request: {0}")]
    DestinationRejected(String),

    /// Destination selector is not a known destination
    #[error("Unsupported destination: {0}")]
    UnsupportedDestination(String),

    /// Source file could not be turned into a metadata record
    #[error("Metadata extraction failed: {0}")]
    MetadataExtraction(String),

    /// Moving an exported file into the clean tree failed
    #[error("Failed to move exported file: {0}")]
    PostExportMove(String),

    /// Source directory missing or not a directory
    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    /// Source directory or file not readable/writable
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl Md2NoteError {
    /// Outcome kind for a per-file error
    ///
    /// Returns `None` for run-fatal errors, which never become outcomes.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Md2NoteError::Validation(_) => Some(ErrorKind::Validation),
            Md2NoteError::Authentication(_) => Some(ErrorKind::Authentication),
            Md2NoteError::TransientNetwork(_) => Some(ErrorKind::TransientNetwork),
            Md2NoteError::DestinationRejected(_) => Some(ErrorKind::DestinationRejected),
            Md2NoteError::MetadataExtraction(_) => Some(ErrorKind::MetadataExtraction),
            Md2NoteError::PostExportMove(_) => Some(ErrorKind::PostExportMove),
            // Local serialization/IO failures inside an exporter are treated
            // as a rejected request: retrying the same input will not help.
            Md2NoteError::Serialization(_) | Md2NoteError::Io(_) => {
                Some(ErrorKind::DestinationRejected)
            }
            Md2NoteError::Configuration(_)
            | Md2NoteError::UnsupportedDestination(_)
            | Md2NoteError::DirectoryNotFound(_)
            | Md2NoteError::PermissionDenied(_) => None,
        }
    }

    /// Whether this error aborts the run before any file is processed
    pub fn is_fatal(&self) -> bool {
        self.kind().is_none()
    }
}

impl From<std::io::Error> for Md2NoteError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => Md2NoteError::PermissionDenied(err.to_string()),
            _ => Md2NoteError::Io(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Md2NoteError {
    fn from(err: serde_json::Error) -> Self {
        Md2NoteError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Md2NoteError {
    fn from(err: serde_yaml::Error) -> Self {
        Md2NoteError::MetadataExtraction(format!("Invalid front matter: {err}"))
    }
}

impl From<toml::de::Error> for Md2NoteError {
    fn from(err: toml::de::Error) -> Self {
        Md2NoteError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<reqwest::Error> for Md2NoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            return Md2NoteError::TransientNetwork(err.to_string());
        }
        if err.is_decode() {
            return Md2NoteError::Serialization(err.to_string());
        }
        match err.status().map(|s| s.as_u16()) {
            Some(401) => Md2NoteError::Authentication(err.to_string()),
            Some(status) if status == 429 || status >= 500 => {
                Md2NoteError::TransientNetwork(err.to_string())
            }
            Some(_) => Md2NoteError::DestinationRejected(err.to_string()),
            None => Md2NoteError::TransientNetwork(err.to_string()),
        }
    }
}

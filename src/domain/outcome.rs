//! Per-file export outcomes

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Kind of per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Bad input record (e.g. empty title and body)
    Validation,
    /// Destination rejected credentials or no session was available
    Authentication,
    /// Destination unreachable; re-running later may succeed
    TransientNetwork,
    /// Destination refused the request
    DestinationRejected,
    /// Front matter or file properties could not be read
    MetadataExtraction,
    /// Document was exported but the source could not be moved
    PostExportMove,
}

impl ErrorKind {
    /// Stable name used in logs and the printed summary
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::TransientNetwork => "TransientNetworkError",
            ErrorKind::DestinationRejected => "DestinationRejectedError",
            ErrorKind::MetadataExtraction => "MetadataExtractionError",
            ErrorKind::PostExportMove => "PostExportMoveError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of processing one source file
///
/// Outcomes are immutable once created; a post-export move failure produces
/// a new outcome through [`ExportOutcome::into_move_failure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutcome {
    source_path: PathBuf,
    succeeded: bool,
    error_kind: Option<ErrorKind>,
    error_detail: Option<String>,
}

impl ExportOutcome {
    /// Successful export
    pub fn success(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            succeeded: true,
            error_kind: None,
            error_detail: None,
        }
    }

    /// Failed export with kind and detail
    pub fn failure(
        source_path: impl Into<PathBuf>,
        kind: ErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            succeeded: false,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
        }
    }

    /// Downgrade a successful export whose source file could not be moved
    pub fn into_move_failure(self, detail: impl Into<String>) -> Self {
        Self::failure(self.source_path, ErrorKind::PostExportMove, detail)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }
}

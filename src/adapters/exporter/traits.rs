//! Exporter trait
//!
//! This module defines the interface every export destination implements.

use crate::domain::errors::Md2NoteError;
use crate::domain::{ErrorKind, ExportOutcome, MetadataRecord, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Export destination
///
/// `export` never returns an error: every per-file failure is reported as a
/// failed [`ExportOutcome`]. Exporting the same record twice into the same
/// placement leaves exactly one document at the destination.
#[async_trait]
pub trait Exporter: Send + Sync {
    /// Short destination name used in logs
    fn name(&self) -> &'static str;

    /// Run-setup check performed before any file is processed
    ///
    /// Must not require credentials; CloudDoc sessions are obtained lazily.
    ///
    /// # Errors
    ///
    /// Returns a fatal error when the destination cannot be used at all on
    /// this machine.
    async fn preflight(&self) -> Result<()> {
        Ok(())
    }

    /// Creates one document for `record`
    async fn export(&self, record: &MetadataRecord) -> ExportOutcome;
}

/// Rejects records with neither a title nor a body
///
/// # Errors
///
/// Returns [`Md2NoteError::Validation`].
pub fn validate_record(record: &MetadataRecord) -> Result<()> {
    if record.is_empty() {
        return Err(Md2NoteError::Validation(format!(
            "{} has no title and no content",
            record.source_path().display()
        )));
    }
    Ok(())
}

/// Hex SHA-256 of the record's title and body
///
/// Destinations tag exported documents with it so a re-export of the same
/// content is recognised without relying on the title alone.
pub fn content_identity(record: &MetadataRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.title().as_bytes());
    hasher.update([0u8]);
    hasher.update(record.body().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Converts an exporter result into an outcome for `record`
pub fn outcome_for(record: &MetadataRecord, result: Result<()>) -> ExportOutcome {
    match result {
        Ok(()) => ExportOutcome::success(record.source_path()),
        Err(e) => {
            let kind = e.kind().unwrap_or(ErrorKind::DestinationRejected);
            ExportOutcome::failure(record.source_path(), kind, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetadataRecordBuilder;

    #[test]
    fn test_validate_record_rejects_whitespace_only() {
        let record = MetadataRecordBuilder::new("blank.md")
            .title("  ")
            .body("\n\t\n")
            .build();
        assert!(matches!(
            validate_record(&record),
            Err(Md2NoteError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_record_accepts_title_only() {
        let record = MetadataRecordBuilder::new("t.md").title("Title").build();
        assert!(validate_record(&record).is_ok());
    }

    #[test]
    fn test_content_identity_depends_on_title_and_body() {
        let record = |title: &str, body: &str| {
            MetadataRecordBuilder::new("a.md").title(title).body(body).build()
        };
        let a = content_identity(&record("T", "body"));
        assert_eq!(a.len(), 64);
        assert_eq!(a, content_identity(&record("T", "body")));
        assert_ne!(a, content_identity(&record("T2", "body")));
        assert_ne!(a, content_identity(&record("T", "body2")));
        assert_ne!(
            content_identity(&record("ab", "c")),
            content_identity(&record("a", "bc"))
        );
    }

    #[test]
    fn test_outcome_for_maps_error_kind() {
        let record = MetadataRecordBuilder::new("a.md").title("A").build();

        let ok = outcome_for(&record, Ok(()));
        assert!(ok.succeeded());

        let failed = outcome_for(
            &record,
            Err(Md2NoteError::Authentication("token expired".to_string())),
        );
        assert!(!failed.succeeded());
        assert_eq!(failed.error_kind(), Some(ErrorKind::Authentication));
        assert!(failed.error_detail().unwrap().contains("token expired"));
    }
}

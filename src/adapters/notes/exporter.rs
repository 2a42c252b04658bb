//! Apple Notes exporter

use super::bridge::NotesBridge;
use crate::adapters::exporter::traits::{
    content_identity, outcome_for, validate_record, Exporter,
};
use crate::core::transform::render_note_html;
use crate::domain::{ExportOutcome, MetadataRecord, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

const IDENTITY_PREFIX: &str = "md2note:";

/// Exports records as notes in one Notes folder
///
/// Each note ends with a marker line holding the record's content identity.
/// A record is skipped, and reported as a success, only when the folder
/// already holds a note with the same title carrying that marker, so
/// distinct files sharing a title are all exported. Every bridge call goes
/// through one lock since the Notes automation bridge cannot handle
/// concurrent requests.
pub struct NotesExporter {
    bridge: Arc<dyn NotesBridge>,
    folder: String,
    include_file_info: bool,
    lock: Mutex<()>,
}

impl NotesExporter {
    pub fn new(bridge: Arc<dyn NotesBridge>, folder: impl Into<String>, include_file_info: bool) -> Self {
        Self {
            bridge,
            folder: folder.into(),
            include_file_info,
            lock: Mutex::new(()),
        }
    }

    /// Target folder for every note of the run
    pub fn folder(&self) -> &str {
        &self.folder
    }

    async fn export_record(&self, record: &MetadataRecord) -> Result<()> {
        validate_record(record)?;

        let _guard = self.lock.lock().await;

        if !self.bridge.folder_exists(&self.folder).await? {
            self.bridge.create_folder(&self.folder).await?;
        }

        let title = note_title(record);
        let marker = identity_marker(record);
        if self.bridge.note_exists(&self.folder, title, &marker).await? {
            tracing::info!(
                path = %record.source_path().display(),
                folder = %self.folder,
                title = %title,
                "Note already exists, skipping"
            );
            return Ok(());
        }

        let mut html = render_note_html(record, self.include_file_info);
        html.push_str(&format!(
            "<div><font size=\"1\" color=\"#999999\">{marker}</font></div>"
        ));
        self.bridge.create_note(&self.folder, title, &html).await?;

        tracing::debug!(folder = %self.folder, title = %title, "Created note");
        Ok(())
    }
}

#[async_trait]
impl Exporter for NotesExporter {
    fn name(&self) -> &'static str {
        "notes"
    }

    async fn preflight(&self) -> Result<()> {
        self.bridge.check_available().await
    }

    async fn export(&self, record: &MetadataRecord) -> ExportOutcome {
        outcome_for(record, self.export_record(record).await)
    }
}

/// Text embedded in the note body to recognise an earlier export
fn identity_marker(record: &MetadataRecord) -> String {
    format!("{IDENTITY_PREFIX}{}", content_identity(record))
}

fn note_title(record: &MetadataRecord) -> &str {
    let title = record.title().trim();
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}

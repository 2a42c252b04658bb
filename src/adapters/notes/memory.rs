//! In-memory Notes bridge
//!
//! Stands in for the Notes application in tests and dry runs.

use super::bridge::NotesBridge;
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A note held by [`InMemoryNotesBridge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNote {
    pub title: String,
    pub html_body: String,
}

/// Notes bridge backed by a map of folder name to notes
#[derive(Debug, Default)]
pub struct InMemoryNotesBridge {
    folders: Mutex<BTreeMap<String, Vec<StoredNote>>>,
    create_failure: Mutex<Option<fn() -> Md2NoteError>>,
    unavailable: bool,
}

impl InMemoryNotesBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge whose availability check fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Makes every following `create_note` call fail with `error()`
    pub fn fail_creates_with(&self, error: fn() -> Md2NoteError) {
        if let Ok(mut failure) = self.create_failure.lock() {
            *failure = Some(error);
        }
    }

    /// Notes in `folder`, in creation order
    pub fn notes(&self, folder: &str) -> Vec<StoredNote> {
        self.folders
            .lock()
            .map(|folders| folders.get(folder).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    pub fn folder_names(&self) -> Vec<String> {
        self.folders
            .lock()
            .map(|folders| folders.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn note_count(&self) -> usize {
        self.folders
            .lock()
            .map(|folders| folders.values().map(Vec::len).sum())
            .unwrap_or_default()
    }

    fn folders(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<StoredNote>>>> {
        self.folders
            .lock()
            .map_err(|_| Md2NoteError::DestinationRejected("Notes store lock poisoned".to_string()))
    }
}

#[async_trait]
impl NotesBridge for InMemoryNotesBridge {
    async fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(Md2NoteError::Configuration(
                "Apple Notes is not available".to_string(),
            ));
        }
        Ok(())
    }

    async fn folder_exists(&self, folder: &str) -> Result<bool> {
        Ok(self.folders()?.contains_key(folder))
    }

    async fn create_folder(&self, folder: &str) -> Result<()> {
        self.folders()?.entry(folder.to_string()).or_default();
        Ok(())
    }

    async fn note_exists(&self, folder: &str, title: &str, marker: &str) -> Result<bool> {
        Ok(self
            .folders()?
            .get(folder)
            .map(|notes| {
                notes
                    .iter()
                    .any(|n| n.title == title && n.html_body.contains(marker))
            })
            .unwrap_or(false))
    }

    async fn create_note(&self, folder: &str, title: &str, html_body: &str) -> Result<()> {
        let failure = self.create_failure.lock().ok().and_then(|f| *f);
        if let Some(error) = failure {
            return Err(error());
        }

        let mut folders = self.folders()?;
        let notes = folders.get_mut(folder).ok_or_else(|| {
            Md2NoteError::DestinationRejected(format!("Folder '{folder}' does not exist"))
        })?;
        notes.push(StoredNote {
            title: title.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

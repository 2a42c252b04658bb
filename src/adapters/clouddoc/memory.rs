//! In-memory Docs/Drive API

use super::api::DocsApi;
use super::auth::Session;
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A document held by [`InMemoryDocsApi`]
#[derive(Debug, Clone, Default)]
pub struct StoredDocument {
    pub title: String,
    pub folder_id: Option<String>,
    pub requests: Vec<Value>,
    pub identity: Option<String>,
}

impl StoredDocument {
    /// Text of the first `insertText` request
    pub fn text(&self) -> &str {
        self.requests
            .iter()
            .find_map(|r| r["insertText"]["text"].as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct State {
    next_id: usize,
    folders: BTreeMap<String, String>,
    documents: BTreeMap<String, StoredDocument>,
    create_calls: usize,
    fail_batch_update: bool,
}

/// Docs API backed by in-process maps
#[derive(Debug, Default)]
pub struct InMemoryDocsApi {
    state: Mutex<State>,
}

impl InMemoryDocsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `batch_update` fail with a rejected request
    pub fn fail_batch_updates(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_batch_update = true;
        }
    }

    pub fn documents(&self) -> Vec<StoredDocument> {
        self.state
            .lock()
            .map(|s| s.documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Folder id by name
    pub fn folder_id(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.folders.get(name).cloned())
    }

    pub fn folder_count(&self) -> usize {
        self.state.lock().map(|s| s.folders.len()).unwrap_or_default()
    }

    /// Number of `create_document` calls, including deleted documents
    pub fn create_calls(&self) -> usize {
        self.state.lock().map(|s| s.create_calls).unwrap_or_default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Md2NoteError::DestinationRejected("Docs store lock poisoned".to_string()))
    }
}

fn next_id(state: &mut State, prefix: &str) -> String {
    state.next_id += 1;
    format!("{prefix}-{}", state.next_id)
}

#[async_trait]
impl DocsApi for InMemoryDocsApi {
    async fn find_folder(&self, _session: &Session, name: &str) -> Result<Option<String>> {
        Ok(self.state()?.folders.get(name).cloned())
    }

    async fn create_folder(&self, _session: &Session, name: &str) -> Result<String> {
        let mut state = self.state()?;
        let id = next_id(&mut state, "folder");
        state.folders.insert(name.to_string(), id.clone());
        Ok(id)
    }

    async fn find_document(
        &self,
        _session: &Session,
        identity: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<String>> {
        let state = self.state()?;
        Ok(state
            .documents
            .iter()
            .find(|(_, doc)| {
                doc.identity.as_deref() == Some(identity) && doc.folder_id.as_deref() == folder_id
            })
            .map(|(id, _)| id.clone()))
    }

    async fn create_document(
        &self,
        _session: &Session,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String> {
        let mut state = self.state()?;
        state.create_calls += 1;
        let id = next_id(&mut state, "doc");
        state.documents.insert(
            id.clone(),
            StoredDocument {
                title: title.to_string(),
                folder_id: folder_id.map(str::to_string),
                ..StoredDocument::default()
            },
        );
        Ok(id)
    }

    async fn batch_update(
        &self,
        _session: &Session,
        document_id: &str,
        requests: &[Value],
    ) -> Result<()> {
        let mut state = self.state()?;
        if state.fail_batch_update {
            return Err(Md2NoteError::DestinationRejected(
                "Invalid requests[0].insertText".to_string(),
            ));
        }
        let doc = state.documents.get_mut(document_id).ok_or_else(|| {
            Md2NoteError::DestinationRejected(format!("Document {document_id} not found"))
        })?;
        doc.requests.extend_from_slice(requests);
        Ok(())
    }

    async fn mark_complete(
        &self,
        _session: &Session,
        document_id: &str,
        identity: &str,
    ) -> Result<()> {
        let mut state = self.state()?;
        let doc = state.documents.get_mut(document_id).ok_or_else(|| {
            Md2NoteError::DestinationRejected(format!("Document {document_id} not found"))
        })?;
        doc.identity = Some(identity.to_string());
        Ok(())
    }

    async fn delete_document(&self, _session: &Session, document_id: &str) -> Result<()> {
        self.state()?.documents.remove(document_id);
        Ok(())
    }
}

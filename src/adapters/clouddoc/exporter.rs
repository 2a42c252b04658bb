//! Google Docs exporter

use super::api::DocsApi;
use super::auth::{Session, SessionProvider};
use crate::adapters::exporter::traits::{
    content_identity, outcome_for, validate_record, Exporter,
};
use crate::core::transform::render_doc_requests;
use crate::domain::{ExportOutcome, MetadataRecord, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Exports records as Google Docs
///
/// The session and the target folder id are resolved on the first export
/// and reused for the rest of the run. The session is requested again once
/// it is within the refresh margin of its expiry. A failed session lookup
/// is not cached, so each file reports its own authentication failure.
pub struct CloudDocExporter {
    api: Arc<dyn DocsApi>,
    sessions: Arc<dyn SessionProvider>,
    folder_name: Option<String>,
    include_file_info: bool,
    session: Mutex<Option<Session>>,
    folder_id: OnceCell<Option<String>>,
}

impl CloudDocExporter {
    /// `folder_name` of `None` places documents in the Drive root
    pub fn new(
        api: Arc<dyn DocsApi>,
        sessions: Arc<dyn SessionProvider>,
        folder_name: Option<String>,
        include_file_info: bool,
    ) -> Self {
        Self {
            api,
            sessions,
            folder_name,
            include_file_info,
            session: Mutex::new(None),
            folder_id: OnceCell::new(),
        }
    }

    pub fn folder_name(&self) -> Option<&str> {
        self.folder_name.as_deref()
    }

    async fn session(&self) -> Result<Session> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            if !session.is_expired_at(Utc::now()) {
                return Ok(session.clone());
            }
            tracing::debug!("Cached session is about to expire, renewing");
        }
        let session = self.sessions.session().await?;
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn folder_id(&self, session: &Session) -> Result<Option<String>> {
        let id = self
            .folder_id
            .get_or_try_init(|| self.resolve_folder(session))
            .await?;
        Ok(id.clone())
    }

    async fn resolve_folder(&self, session: &Session) -> Result<Option<String>> {
        let Some(name) = &self.folder_name else {
            return Ok(None);
        };
        if let Some(id) = self.api.find_folder(session, name).await? {
            tracing::debug!(folder = %name, folder_id = %id, "Using existing Drive folder");
            return Ok(Some(id));
        }
        Ok(Some(self.api.create_folder(session, name).await?))
    }

    async fn export_record(&self, record: &MetadataRecord) -> Result<()> {
        validate_record(record)?;

        let session = self.session().await?;
        let session = &session;
        let folder_id = self.folder_id(session).await?;
        let identity = content_identity(record);

        if let Some(existing) = self
            .api
            .find_document(session, &identity, folder_id.as_deref())
            .await?
        {
            tracing::info!(
                path = %record.source_path().display(),
                document_id = %existing,
                "Document already exists, skipping"
            );
            return Ok(());
        }

        let requests = render_doc_requests(record, self.include_file_info);
        let document_id = self
            .api
            .create_document(session, doc_title(record), folder_id.as_deref())
            .await?;

        if let Err(e) = self.fill_document(session, &document_id, &requests, &identity).await {
            if let Err(cleanup) = self.api.delete_document(session, &document_id).await {
                tracing::warn!(
                    document_id = %document_id,
                    error = %cleanup,
                    "Failed to delete partially written document"
                );
            }
            return Err(e);
        }

        tracing::debug!(document_id = %document_id, "Created document");
        Ok(())
    }

    async fn fill_document(
        &self,
        session: &Session,
        document_id: &str,
        requests: &[serde_json::Value],
        identity: &str,
    ) -> Result<()> {
        if !requests.is_empty() {
            self.api.batch_update(session, document_id, requests).await?;
        }
        // Written last so an interrupted export is never mistaken for a
        // completed one
        self.api.mark_complete(session, document_id, identity).await
    }
}

#[async_trait]
impl Exporter for CloudDocExporter {
    fn name(&self) -> &'static str {
        "clouddoc"
    }

    async fn export(&self, record: &MetadataRecord) -> ExportOutcome {
        outcome_for(record, self.export_record(record).await)
    }
}

fn doc_title(record: &MetadataRecord) -> &str {
    let title = record.title().trim();
    if title.is_empty() {
        "Untitled"
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clouddoc::memory::InMemoryDocsApi;
    use crate::domain::errors::Md2NoteError;
    use crate::domain::{ErrorKind, MetadataRecordBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSessions {
        calls: AtomicUsize,
        fail: bool,
        lifetime: Option<chrono::Duration>,
    }

    impl StaticSessions {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
                lifetime: None,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
                lifetime: None,
            })
        }

        fn expiring_in(lifetime: chrono::Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
                lifetime: Some(lifetime),
            })
        }
    }

    #[async_trait]
    impl SessionProvider for StaticSessions {
        async fn session(&self) -> Result<Session> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Md2NoteError::Authentication("no token".to_string()));
            }
            Ok(Session::new("t").with_expiry(self.lifetime.map(|l| Utc::now() + l)))
        }
    }

    fn record(title: &str, body: &str) -> MetadataRecord {
        MetadataRecordBuilder::new(format!("/src/{title}.md"))
            .title(title)
            .body(body)
            .build()
    }

    #[tokio::test]
    async fn test_export_creates_folder_and_document() {
        let api = Arc::new(InMemoryDocsApi::new());
        let exporter = CloudDocExporter::new(
            api.clone(),
            StaticSessions::ok(),
            Some("Imports".to_string()),
            false,
        );

        let outcome = exporter.export(&record("Plan", "# Plan\n\n**Do** it")).await;
        assert!(outcome.succeeded());

        let folder_id = api.folder_id("Imports").unwrap();
        let docs = api.documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "Plan");
        assert_eq!(docs[0].folder_id.as_deref(), Some(folder_id.as_str()));
        assert_eq!(docs[0].text(), "Do it\n");
        assert!(docs[0].identity.is_some());
    }

    #[tokio::test]
    async fn test_export_twice_creates_one_document() {
        let api = Arc::new(InMemoryDocsApi::new());
        let exporter = CloudDocExporter::new(api.clone(), StaticSessions::ok(), None, true);
        let record = record("Plan", "body");

        assert!(exporter.export(&record).await.succeeded());
        assert!(exporter.export(&record).await.succeeded());
        assert_eq!(api.documents().len(), 1);
        assert_eq!(api.create_calls(), 1);
        assert_eq!(api.folder_count(), 0);
    }

    #[tokio::test]
    async fn test_session_and_folder_resolved_once() {
        let api = Arc::new(InMemoryDocsApi::new());
        let sessions = StaticSessions::ok();
        let exporter =
            CloudDocExporter::new(api.clone(), sessions.clone(), Some("F".to_string()), false);

        exporter.export(&record("A", "a")).await;
        exporter.export(&record("B", "b")).await;

        assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.folder_count(), 1);
        assert_eq!(api.documents().len(), 2);
    }

    #[tokio::test]
    async fn test_expiring_session_is_renewed() {
        let api = Arc::new(InMemoryDocsApi::new());
        let sessions = StaticSessions::expiring_in(chrono::Duration::seconds(10));
        let exporter = CloudDocExporter::new(api.clone(), sessions.clone(), None, false);

        assert!(exporter.export(&record("A", "a")).await.succeeded());
        assert!(exporter.export(&record("B", "b")).await.succeeded());

        assert_eq!(sessions.calls.load(Ordering::SeqCst), 2);
        assert_eq!(api.documents().len(), 2);
    }

    #[tokio::test]
    async fn test_long_lived_session_is_reused() {
        let api = Arc::new(InMemoryDocsApi::new());
        let sessions = StaticSessions::expiring_in(chrono::Duration::hours(1));
        let exporter = CloudDocExporter::new(api.clone(), sessions.clone(), None, false);

        exporter.export(&record("A", "a")).await;
        exporter.export(&record("B", "b")).await;

        assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_root_export_ignores_copy_in_folder() {
        let api = Arc::new(InMemoryDocsApi::new());
        let record = record("Plan", "body");

        let in_folder = CloudDocExporter::new(
            api.clone(),
            StaticSessions::ok(),
            Some("Archive".to_string()),
            false,
        );
        assert!(in_folder.export(&record).await.succeeded());

        let in_root = CloudDocExporter::new(api.clone(), StaticSessions::ok(), None, false);
        assert!(in_root.export(&record).await.succeeded());
        assert!(in_root.export(&record).await.succeeded());

        let docs = api.documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs.iter().filter(|d| d.folder_id.is_none()).count(), 1);
    }

    #[tokio::test]
    async fn test_missing_session_is_authentication_error_per_file() {
        let api = Arc::new(InMemoryDocsApi::new());
        let sessions = StaticSessions::failing();
        let exporter = CloudDocExporter::new(api.clone(), sessions.clone(), None, false);

        for name in ["A", "B"] {
            let outcome = exporter.export(&record(name, "x")).await;
            assert_eq!(outcome.error_kind(), Some(ErrorKind::Authentication));
        }
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 2);
        assert!(api.documents().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insert_deletes_partial_document() {
        let api = Arc::new(InMemoryDocsApi::new());
        api.fail_batch_updates();
        let exporter = CloudDocExporter::new(api.clone(), StaticSessions::ok(), None, false);

        let outcome = exporter.export(&record("Plan", "body")).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::DestinationRejected));
        assert_eq!(api.create_calls(), 1);
        assert!(api.documents().is_empty());
    }

    #[tokio::test]
    async fn test_empty_record_never_reaches_api() {
        let api = Arc::new(InMemoryDocsApi::new());
        let sessions = StaticSessions::ok();
        let exporter = CloudDocExporter::new(api.clone(), sessions.clone(), None, false);

        let outcome = exporter.export(&record("", "")).await;
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Validation));
        assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);
    }
}

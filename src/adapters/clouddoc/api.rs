//! Google Docs and Drive REST client
//!
//! Documents are created through the Drive API so they can be placed in a
//! folder directly; content goes through the Docs `batchUpdate` endpoint.
//! Exported documents carry an `appProperties` marker holding their content
//! identity.

use super::auth::Session;
use crate::domain::errors::Md2NoteError;
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// `appProperties` key holding the content identity
pub const IDENTITY_PROPERTY: &str = "md2noteId";

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const DOCUMENT_MIME_TYPE: &str = "application/vnd.google-apps.document";

/// Docs/Drive operations used by the exporter
///
/// `folder_id` of `None` means the Drive root.
#[async_trait]
pub trait DocsApi: Send + Sync {
    async fn find_folder(&self, session: &Session, name: &str) -> Result<Option<String>>;

    async fn create_folder(&self, session: &Session, name: &str) -> Result<String>;

    /// Finds a completed document carrying `identity`
    async fn find_document(
        &self,
        session: &Session,
        identity: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<String>>;

    /// Creates an empty document and returns its id
    async fn create_document(
        &self,
        session: &Session,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String>;

    async fn batch_update(&self, session: &Session, document_id: &str, requests: &[Value])
        -> Result<()>;

    /// Tags a document with its identity once its content is complete
    async fn mark_complete(&self, session: &Session, document_id: &str, identity: &str)
        -> Result<()>;

    async fn delete_document(&self, session: &Session, document_id: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

/// HTTP implementation of [`DocsApi`]
#[derive(Debug, Clone)]
pub struct DocsHttpClient {
    client: Client,
    docs_base_url: String,
    drive_base_url: String,
}

impl DocsHttpClient {
    pub fn with_client(client: Client, docs_base_url: &str, drive_base_url: &str) -> Self {
        Self {
            client,
            docs_base_url: docs_base_url.trim_end_matches('/').to_string(),
            drive_base_url: drive_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn files_url(&self) -> String {
        format!("{}/drive/v3/files", self.drive_base_url)
    }

    async fn query_first(&self, session: &Session, query: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.files_url())
            .bearer_auth(session.access_token())
            .query(&[
                ("q", query),
                ("fields", "files(id)"),
                ("spaces", "drive"),
                ("pageSize", "1"),
            ])
            .send()
            .await?;
        let list: FileList = check_status(response, "Drive query").await?.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_file(&self, session: &Session, metadata: Value) -> Result<String> {
        let response = self
            .client
            .post(self.files_url())
            .bearer_auth(session.access_token())
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()
            .await?;
        let file: FileRef = check_status(response, "Drive create").await?.json().await?;
        Ok(file.id)
    }
}

/// Builds the shared HTTP client
///
/// # Errors
///
/// Returns [`Md2NoteError::Configuration`] if TLS initialisation fails.
pub fn build_http_client(timeout_seconds: u64) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_seconds))
        .connect_timeout(Duration::from_secs(timeout_seconds.min(30)))
        .build()
        .map_err(|e| Md2NoteError::Configuration(format!("Failed to build HTTP client: {e}")))
}

#[async_trait]
impl DocsApi for DocsHttpClient {
    async fn find_folder(&self, session: &Session, name: &str) -> Result<Option<String>> {
        let query = format!(
            "name = '{}' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false",
            escape_query(name)
        );
        self.query_first(session, &query).await
    }

    async fn create_folder(&self, session: &Session, name: &str) -> Result<String> {
        let id = self
            .create_file(session, json!({ "name": name, "mimeType": FOLDER_MIME_TYPE }))
            .await?;
        tracing::info!(folder = %name, folder_id = %id, "Created Drive folder");
        Ok(id)
    }

    async fn find_document(
        &self,
        session: &Session,
        identity: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<String>> {
        let mut query = format!(
            "appProperties has {{ key='{IDENTITY_PROPERTY}' and value='{}' }} and mimeType = '{DOCUMENT_MIME_TYPE}' and trashed = false",
            escape_query(identity)
        );
        // Without a folder the document lives in the Drive root
        let parent = folder_id.unwrap_or("root");
        query.push_str(&format!(" and '{}' in parents", escape_query(parent)));
        self.query_first(session, &query).await
    }

    async fn create_document(
        &self,
        session: &Session,
        title: &str,
        folder_id: Option<&str>,
    ) -> Result<String> {
        let mut metadata = json!({ "name": title, "mimeType": DOCUMENT_MIME_TYPE });
        if let Some(folder_id) = folder_id {
            metadata["parents"] = json!([folder_id]);
        }
        self.create_file(session, metadata).await
    }

    async fn batch_update(
        &self,
        session: &Session,
        document_id: &str,
        requests: &[Value],
    ) -> Result<()> {
        let url = format!("{}/v1/documents/{document_id}:batchUpdate", self.docs_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(session.access_token())
            .json(&json!({ "requests": requests }))
            .send()
            .await?;
        check_status(response, "Docs batchUpdate").await?;
        Ok(())
    }

    async fn mark_complete(
        &self,
        session: &Session,
        document_id: &str,
        identity: &str,
    ) -> Result<()> {
        let response = self
            .client
            .patch(format!("{}/{document_id}", self.files_url()))
            .bearer_auth(session.access_token())
            .query(&[("fields", "id")])
            .json(&json!({ "appProperties": { IDENTITY_PROPERTY: identity } }))
            .send()
            .await?;
        check_status(response, "Drive update").await?;
        Ok(())
    }

    async fn delete_document(&self, session: &Session, document_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{document_id}", self.files_url()))
            .bearer_auth(session.access_token())
            .send()
            .await?;
        check_status(response, "Drive delete").await?;
        Ok(())
    }
}

/// Maps a non-success response onto the error taxonomy
async fn check_status(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = format!("{operation} failed ({status}): {body}");
    Err(match status.as_u16() {
        401 => Md2NoteError::Authentication(message),
        // Drive reports rate limiting as 403 with a rate limit reason
        403 if body.contains("rateLimitExceeded") || body.contains("userRateLimitExceeded") => {
            Md2NoteError::TransientNetwork(message)
        }
        408 | 429 => Md2NoteError::TransientNetwork(message),
        s if s >= 500 => Md2NoteError::TransientNetwork(message),
        _ => Md2NoteError::DestinationRejected(message),
    })
}

/// Escapes a value for a Drive query string literal
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> DocsHttpClient {
        DocsHttpClient::with_client(Client::new(), &server.url(), &server.url())
    }

    fn session() -> Session {
        Session::new("token-1")
    }

    #[test]
    fn test_escape_query() {
        assert_eq!(escape_query("Bob's notes"), "Bob\\'s notes");
        assert_eq!(escape_query("a\\b"), "a\\\\b");
    }

    #[tokio::test]
    async fn test_find_folder_sends_query_and_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/drive/v3/files")
            .match_header("authorization", "Bearer token-1")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                format!("name = 'Imports' and mimeType = '{FOLDER_MIME_TYPE}' and trashed = false"),
            ))
            .with_status(200)
            .with_body(r#"{"files":[{"id":"folder-9"}]}"#)
            .create_async()
            .await;

        let id = client(&server).find_folder(&session(), "Imports").await.unwrap();
        assert_eq!(id.as_deref(), Some("folder-9"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_document_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"files":[]}"#)
            .create_async()
            .await;

        let id = client(&server)
            .find_document(&session(), "abc", Some("folder-1"))
            .await
            .unwrap();
        assert!(id.is_none());
    }

    #[tokio::test]
    async fn test_find_document_without_folder_is_limited_to_root() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/drive/v3/files")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                format!(
                    "appProperties has {{ key='{IDENTITY_PROPERTY}' and value='abc' }} and mimeType = '{DOCUMENT_MIME_TYPE}' and trashed = false and 'root' in parents"
                ),
            ))
            .with_status(200)
            .with_body(r#"{"files":[]}"#)
            .create_async()
            .await;

        let id = client(&server)
            .find_document(&session(), "abc", None)
            .await
            .unwrap();
        assert!(id.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_document_in_folder() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/drive/v3/files")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "name": "Plan",
                "mimeType": DOCUMENT_MIME_TYPE,
                "parents": ["folder-1"]
            })))
            .with_status(200)
            .with_body(r#"{"id":"doc-1"}"#)
            .create_async()
            .await;

        let id = client(&server)
            .create_document(&session(), "Plan", Some("folder-1"))
            .await
            .unwrap();
        assert_eq!(id, "doc-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_batch_update_posts_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/documents/doc-1:batchUpdate")
            .match_body(Matcher::PartialJson(json!({
                "requests": [{ "insertText": { "location": { "index": 1 }, "text": "Hi\n" } }]
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let requests = vec![json!({ "insertText": { "location": { "index": 1 }, "text": "Hi\n" } })];
        client(&server)
            .batch_update(&session(), "doc-1", &requests)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_mark_complete_sets_app_property() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/drive/v3/files/doc-1")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({ "appProperties": { IDENTITY_PROPERTY: "abc" } })))
            .with_status(200)
            .with_body(r#"{"id":"doc-1"}"#)
            .create_async()
            .await;

        client(&server)
            .mark_complete(&session(), "doc-1", "abc")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("DELETE", "/drive/v3/files/a")
            .with_status(401)
            .create_async()
            .await;
        let _unavailable = server
            .mock("DELETE", "/drive/v3/files/b")
            .with_status(503)
            .create_async()
            .await;
        let _rate_limited = server
            .mock("DELETE", "/drive/v3/files/c")
            .with_status(403)
            .with_body(r#"{"error":{"errors":[{"reason":"userRateLimitExceeded"}]}}"#)
            .create_async()
            .await;
        let _not_found = server
            .mock("DELETE", "/drive/v3/files/d")
            .with_status(404)
            .create_async()
            .await;

        let api = client(&server);
        let s = session();
        assert!(matches!(
            api.delete_document(&s, "a").await,
            Err(Md2NoteError::Authentication(_))
        ));
        assert!(matches!(
            api.delete_document(&s, "b").await,
            Err(Md2NoteError::TransientNetwork(_))
        ));
        assert!(matches!(
            api.delete_document(&s, "c").await,
            Err(Md2NoteError::TransientNetwork(_))
        ));
        assert!(matches!(
            api.delete_document(&s, "d").await,
            Err(Md2NoteError::DestinationRejected(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transient() {
        let api = DocsHttpClient::with_client(
            build_http_client(2).unwrap(),
            "http://127.0.0.1:1",
            "http://127.0.0.1:1",
        );
        let err = api.find_folder(&session(), "x").await.unwrap_err();
        assert!(matches!(err, Md2NoteError::TransientNetwork(_)));
    }
}

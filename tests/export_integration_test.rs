//! End-to-end export runs against in-memory destinations

use chrono::{Duration, Utc};
use md2note::adapters::clouddoc::{
    CloudDocExporter, InMemoryDocsApi, MemoryTokenStore, OAuthSessionProvider, StoredToken,
    TOKEN_KEY,
};
use md2note::adapters::exporter::{create_exporter_with_token_store, create_notes_exporter};
use md2note::adapters::notes::InMemoryNotesBridge;
use md2note::config::{DestinationKind, ExporterConfig};
use md2note::core::export::{ExportCoordinator, RunState};
use md2note::domain::ErrorKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Two notes and one empty file
fn sample_tree(root: &Path) {
    write(
        root,
        "projects/plan.md",
        "---\ntitle: Q3 Plan\ntags: work\n---\n# Goals\n\n- ship it\n",
    );
    write(root, "journal.md", "# Monday\n\nQuiet day.\n");
    write(root, "empty.md", "");
}

#[tokio::test]
async fn test_notes_export_end_to_end() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    let clean = temp.path().join("archive");
    sample_tree(&source);

    let bridge = Arc::new(InMemoryNotesBridge::new());
    let config =
        ExporterConfig::new(DestinationKind::Notes, Some("Imported".to_string()), false).unwrap();
    let exporter = create_notes_exporter(&config, bridge.clone()).unwrap();

    let mut coordinator = ExportCoordinator::new(exporter);
    let summary = coordinator.execute(&source, &clean).await.unwrap();

    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(summary.total_attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.failures[0].error_kind(), Some(ErrorKind::Validation));
    assert_eq!(summary.failures[0].source_path(), source.join("empty.md"));

    assert!(clean.join("projects/plan.md").exists());
    assert!(clean.join("journal.md").exists());
    assert!(!source.join("projects/plan.md").exists());
    assert!(source.join("empty.md").exists());

    let notes = bridge.notes("Imported");
    let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Q3 Plan"));
    assert!(titles.contains(&"Monday"));

    let plan = notes.iter().find(|n| n.title == "Q3 Plan").unwrap();
    assert!(plan.html_body.contains("ship it"));
    assert!(plan.html_body.contains("File Info"));
}

#[tokio::test]
async fn test_notes_reexport_skips_existing_note() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    let clean = temp.path().join("clean");
    write(&source, "a.md", "# Alpha\n\nbody\n");

    let bridge = Arc::new(InMemoryNotesBridge::new());
    let config = ExporterConfig::new(DestinationKind::Notes, None, false).unwrap();
    let exporter = create_notes_exporter(&config, bridge.clone()).unwrap();

    let first = ExportCoordinator::new(exporter.clone())
        .execute(&source, &clean)
        .await
        .unwrap();
    assert_eq!(first.succeeded, 1);

    // Restore the file as if the archive had been undone
    fs::rename(clean.join("a.md"), source.join("a.md")).unwrap();

    let second = ExportCoordinator::new(exporter)
        .execute(&source, &clean)
        .await
        .unwrap();
    assert_eq!(second.succeeded, 1);
    assert_eq!(bridge.note_count(), 1);
    assert!(clean.join("a.md").exists());
}

#[tokio::test]
async fn test_notes_same_title_in_two_directories_exports_both() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    let clean = temp.path().join("clean");
    write(&source, "a/README.md", "# Setup\n\nInstall the first tool.\n");
    write(&source, "b/README.md", "# Setup\n\nInstall the second tool.\n");

    let bridge = Arc::new(InMemoryNotesBridge::new());
    let config = ExporterConfig::new(DestinationKind::Notes, Some("Docs".to_string()), false)
        .unwrap();
    let exporter = create_notes_exporter(&config, bridge.clone()).unwrap();

    let summary = ExportCoordinator::new(exporter)
        .execute(&source, &clean)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert!(clean.join("a/README.md").exists());
    assert!(clean.join("b/README.md").exists());

    let notes = bridge.notes("Docs");
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.title == "Setup"));
    assert!(notes.iter().any(|n| n.html_body.contains("first tool")));
    assert!(notes.iter().any(|n| n.html_body.contains("second tool")));
}

#[tokio::test]
async fn test_clouddoc_without_stored_token_fails_every_file() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    let clean = temp.path().join("clean");
    sample_tree(&source);

    let config = ExporterConfig::new(DestinationKind::CloudDoc, None, false).unwrap();
    let exporter =
        create_exporter_with_token_store(&config, Arc::new(MemoryTokenStore::new())).unwrap();

    let summary = ExportCoordinator::new(exporter)
        .execute(&source, &clean)
        .await
        .unwrap();

    assert_eq!(summary.total_attempted, 3);
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.exit_code(), 1);
    let by_kind = summary.failures_by_kind();
    assert_eq!(by_kind.get("AuthenticationError"), Some(&2));
    assert_eq!(by_kind.get("ValidationError"), Some(&1));
    assert!(source.join("journal.md").exists());
    assert!(!clean.join("journal.md").exists());
}

#[tokio::test]
async fn test_clouddoc_expired_token_without_refresh_fails_authentication() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    write(&source, "a.md", "# A\n\ntext\n");

    let expired = StoredToken::new("stale".to_string(), Some(Utc::now() - Duration::hours(1)));
    let store = Arc::new(MemoryTokenStore::with_token(TOKEN_KEY, expired));
    let config = ExporterConfig::new(DestinationKind::CloudDoc, None, false).unwrap();
    let exporter = create_exporter_with_token_store(&config, store).unwrap();

    let summary = ExportCoordinator::new(exporter)
        .execute(&source, &temp.path().join("clean"))
        .await
        .unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.failures[0].error_kind(),
        Some(ErrorKind::Authentication)
    );
    assert!(source.join("a.md").exists());
}

#[tokio::test]
async fn test_clouddoc_export_with_valid_token() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes");
    let clean = temp.path().join("clean");
    sample_tree(&source);

    let token = StoredToken::new("fresh".to_string(), Some(Utc::now() + Duration::hours(1)));
    let sessions = OAuthSessionProvider::new(
        Arc::new(MemoryTokenStore::with_token(TOKEN_KEY, token)),
        temp.path().join("credentials.json"),
        reqwest::Client::new(),
    );
    let api = Arc::new(InMemoryDocsApi::new());
    let exporter = Arc::new(CloudDocExporter::new(
        api.clone(),
        Arc::new(sessions),
        Some("Imported".to_string()),
        false,
    ));

    let summary = ExportCoordinator::new(exporter)
        .execute(&source, &clean)
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(api.folder_count(), 1);

    let documents = api.documents();
    assert_eq!(documents.len(), 2);
    let folder_id = api.folder_id("Imported");
    assert!(documents.iter().all(|d| d.folder_id == folder_id));
    assert!(documents
        .iter()
        .any(|d| d.title == "Q3 Plan" && d.text().contains("ship it")));
    assert!(clean.join("projects/plan.md").exists());
}

//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use md2note::config::{load_config, DestinationKind, ExporterConfig, Organization};
use md2note::domain::Md2NoteError;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("MD2NOTE_APPLICATION_LOG_LEVEL");
    std::env::remove_var("MD2NOTE_DESTINATION_KIND");
    std::env::remove_var("MD2NOTE_DESTINATION_FOLDER");
    std::env::remove_var("MD2NOTE_SOURCE_ROOT");
    std::env::remove_var("TEST_MD2NOTE_HOME");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"

[source]
root = "/data/notes"
clean = "/data/archive"
extensions = ["md", "txt"]

[destination]
kind = "google_docs"
auto_folder = true
auto_folder_pattern = "Import %Y-%m-%d"
include_file_info = false

[notes]
account = "iCloud"

[clouddoc]
credentials_path = "/etc/md2note/credentials.json"
token_store_path = "/var/lib/md2note/tokens.json"
timeout_seconds = 10

[logging]
local_enabled = true
local_path = "/tmp/md2note-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.source.root, Some(PathBuf::from("/data/notes")));
    assert_eq!(config.source.extensions, vec!["md", "txt"]);
    assert_eq!(config.notes.account.as_deref(), Some("iCloud"));
    assert_eq!(config.clouddoc.timeout_seconds, 10);
    assert_eq!(config.logging.local_rotation, "hourly");

    let exporter = ExporterConfig::from_config(&config).unwrap();
    assert_eq!(exporter.destination_kind(), DestinationKind::CloudDoc);
    assert_eq!(exporter.organization(), &Organization::AutoGenerate);
    assert_eq!(exporter.auto_folder_pattern(), "Import %Y-%m-%d");
    assert!(!exporter.include_file_info());
    let credentials = exporter.credentials().unwrap();
    assert_eq!(
        credentials.token_store_path,
        PathBuf::from("/var/lib/md2note/tokens.json")
    );
}

#[test]
fn test_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config("");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.destination.kind, "notes");
    assert!(config.destination.include_file_info);
    assert_eq!(config.source.extensions, vec!["md", "markdown"]);
    assert!(!config.logging.local_enabled);

    let exporter = ExporterConfig::from_config(&config).unwrap();
    assert_eq!(exporter.organization(), &Organization::Default);
    assert!(exporter.credentials().is_none());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_MD2NOTE_HOME", "/home/tester");

    let file = write_config(
        r#"
[clouddoc]
credentials_path = "${TEST_MD2NOTE_HOME}/credentials.json"
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.clouddoc.credentials_path,
        PathBuf::from("/home/tester/credentials.json")
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_substitution_variable_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[clouddoc]
credentials_path = "${TEST_MD2NOTE_HOME}/credentials.json"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, Md2NoteError::Configuration(_)));
    assert!(err.to_string().contains("TEST_MD2NOTE_HOME"));
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("MD2NOTE_DESTINATION_KIND", "clouddoc");
    std::env::set_var("MD2NOTE_DESTINATION_FOLDER", "From Env");
    std::env::set_var("MD2NOTE_SOURCE_ROOT", "/env/notes");

    let file = write_config(
        r#"
[destination]
kind = "notes"
"#,
    );
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.destination.kind, "clouddoc");
    assert_eq!(config.destination.folder.as_deref(), Some("From Env"));
    assert_eq!(config.source.root, Some(PathBuf::from("/env/notes")));

    cleanup_env_vars();
}

#[test]
fn test_conflicting_folder_options_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[destination]
folder = "Work"
auto_folder = true
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("mutually exclusive"));
}

#[test]
fn test_unknown_destination_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[destination]
kind = "evernote"
"#,
    );
    assert!(load_config(file.path()).is_err());
}

#[test]
fn test_missing_file_is_configuration_error() {
    let err = load_config("/definitely/not/here/md2note.toml").unwrap_err();
    assert!(matches!(err, Md2NoteError::Configuration(_)));
}

//! Configuration schema types
//!
//! Every section is optional in the TOML file; a missing section takes its
//! defaults so that MD2Note runs without any configuration file at all.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main MD2Note configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Md2NoteConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Source tree settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Destination selection and placement
    #[serde(default)]
    pub destination: DestinationConfig,

    /// Apple Notes settings
    #[serde(default)]
    pub notes: NotesConfig,

    /// Google Docs/Drive settings
    #[serde(default)]
    pub clouddoc: CloudDocConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Md2NoteConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.destination.validate()?;
        self.clouddoc.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Source tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory scanned for Markdown files
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Directory exported files are moved to (default: `<root>/clean`)
    #[serde(default)]
    pub clean: Option<PathBuf>,

    /// File extensions treated as Markdown, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.extensions.is_empty() {
            return Err("source.extensions cannot be empty".to_string());
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.starts_with('.') || e.is_empty()) {
            return Err(format!(
                "Invalid source extension '{ext}'. Use bare extensions like \"md\""
            ));
        }
        Ok(())
    }

    /// Clean directory for a given source root
    pub fn clean_dir_for(&self, root: &std::path::Path) -> PathBuf {
        self.clean.clone().unwrap_or_else(|| root.join("clean"))
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: None,
            clean: None,
            extensions: default_extensions(),
        }
    }
}

/// Destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Destination selector (notes or clouddoc)
    #[serde(default = "default_destination_kind")]
    pub kind: String,

    /// Named folder for every exported document
    #[serde(default)]
    pub folder: Option<String>,

    /// Generate a unique folder name for this run
    #[serde(default)]
    pub auto_folder: bool,

    /// chrono format string used to build auto-generated folder names
    #[serde(default = "default_auto_folder_pattern")]
    pub auto_folder_pattern: String,

    /// Append a File Info section to every document
    #[serde(default = "default_true")]
    pub include_file_info: bool,
}

impl DestinationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_kinds = ["notes", "apple_notes", "clouddoc", "google_docs"];
        if !valid_kinds.contains(&self.kind.as_str()) {
            return Err(format!(
                "Invalid destination.kind '{}'. Must be one of: {}",
                self.kind,
                valid_kinds.join(", ")
            ));
        }

        if self.folder.is_some() && self.auto_folder {
            return Err("destination.folder and destination.auto_folder are mutually exclusive".to_string());
        }

        if let Some(folder) = &self.folder {
            if folder.trim().is_empty() {
                return Err("destination.folder cannot be empty".to_string());
            }
        }

        if self.auto_folder_pattern.trim().is_empty() {
            return Err("destination.auto_folder_pattern cannot be empty".to_string());
        }

        Ok(())
    }
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            kind: default_destination_kind(),
            folder: None,
            auto_folder: false,
            auto_folder_pattern: default_auto_folder_pattern(),
            include_file_info: true,
        }
    }
}

/// Apple Notes configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesConfig {
    /// Notes account to create folders in (default account when unset)
    #[serde(default)]
    pub account: Option<String>,

    /// Folder used when no folder is configured
    #[serde(default = "default_notes_folder")]
    pub default_folder: String,

    /// Path to the osascript binary
    #[serde(default = "default_osascript_path")]
    pub osascript_path: PathBuf,
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            account: None,
            default_folder: default_notes_folder(),
            osascript_path: default_osascript_path(),
        }
    }
}

/// Google Docs/Drive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudDocConfig {
    /// OAuth client secrets file (credentials.json)
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Token cache file (default: platform config dir)
    #[serde(default)]
    pub token_store_path: Option<PathBuf>,

    /// Docs API base URL
    #[serde(default = "default_docs_base_url")]
    pub docs_base_url: String,

    /// Drive API base URL
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    /// HTTP request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl CloudDocConfig {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("clouddoc.docs_base_url", &self.docs_base_url),
            ("clouddoc.drive_base_url", &self.drive_base_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                return Err(format!("{name} must start with http:// or https://"));
            }
        }

        if self.timeout_seconds == 0 {
            return Err("clouddoc.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }

    /// Token cache file, falling back to `<config dir>/md2note/tokens.json`
    pub fn resolved_token_store_path(&self) -> PathBuf {
        if let Some(path) = &self.token_store_path {
            return path.clone();
        }
        match directories::BaseDirs::new() {
            Some(dirs) => dirs.config_dir().join("md2note").join("tokens.json"),
            None => PathBuf::from(".md2note-tokens.json"),
        }
    }
}

impl Default for CloudDocConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            token_store_path: None,
            docs_base_url: default_docs_base_url(),
            drive_base_url: default_drive_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled = true".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "markdown".to_string()]
}

fn default_destination_kind() -> String {
    "notes".to_string()
}

fn default_auto_folder_pattern() -> String {
    "MD2Note Import %Y-%m-%d %H.%M.%S".to_string()
}

fn default_notes_folder() -> String {
    "Notes".to_string()
}

fn default_osascript_path() -> PathBuf {
    PathBuf::from("/usr/bin/osascript")
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_docs_base_url() -> String {
    "https://docs.googleapis.com".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

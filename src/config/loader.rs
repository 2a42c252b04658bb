//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::Md2NoteConfig;
use crate::domain::errors::Md2NoteError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "md2note.toml";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into Md2NoteConfig
/// 4. Applies environment variable overrides (MD2NOTE_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File does not exist or cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use md2note::config::loader::load_config;
///
/// let config = load_config("md2note.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<Md2NoteConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Md2NoteError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        Md2NoteError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let config: Md2NoteConfig = toml::from_str(&contents)
        .map_err(|e| Md2NoteError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    finish(config)
}

/// Loads configuration, tolerating a missing file at the default location
///
/// An explicitly named file must exist. When `path` is `None` and
/// [`DEFAULT_CONFIG_PATH`] is absent, built-in defaults are used (environment
/// overrides still apply).
///
/// # Errors
///
/// Same as [`load_config`]
pub fn load_config_or_default(path: Option<&Path>) -> Result<Md2NoteConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                load_config(default_path)
            } else {
                tracing::debug!(
                    path = DEFAULT_CONFIG_PATH,
                    "No configuration file found, using defaults"
                );
                finish(Md2NoteConfig::default())
            }
        }
    }
}

fn finish(mut config: Md2NoteConfig) -> Result<Md2NoteConfig> {
    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        Md2NoteError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| Md2NoteError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(Md2NoteError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using MD2NOTE_* prefix
///
/// Environment variables follow the pattern: MD2NOTE_<SECTION>_<KEY>
/// For example: MD2NOTE_DESTINATION_KIND, MD2NOTE_CLOUDDOC_CREDENTIALS_PATH
fn apply_env_overrides(config: &mut Md2NoteConfig) {
    if let Ok(val) = std::env::var("MD2NOTE_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("MD2NOTE_SOURCE_ROOT") {
        config.source.root = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("MD2NOTE_SOURCE_CLEAN") {
        config.source.clean = Some(PathBuf::from(val));
    }

    // Destination overrides
    if let Ok(val) = std::env::var("MD2NOTE_DESTINATION_KIND") {
        config.destination.kind = val;
    }
    if let Ok(val) = std::env::var("MD2NOTE_DESTINATION_FOLDER") {
        config.destination.folder = Some(val);
    }
    if let Ok(val) = std::env::var("MD2NOTE_DESTINATION_AUTO_FOLDER") {
        config.destination.auto_folder = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MD2NOTE_DESTINATION_INCLUDE_FILE_INFO") {
        config.destination.include_file_info = val.parse().unwrap_or(true);
    }

    // Notes overrides
    if let Ok(val) = std::env::var("MD2NOTE_NOTES_ACCOUNT") {
        config.notes.account = Some(val);
    }
    if let Ok(val) = std::env::var("MD2NOTE_NOTES_DEFAULT_FOLDER") {
        config.notes.default_folder = val;
    }

    // Cloud doc overrides
    if let Ok(val) = std::env::var("MD2NOTE_CLOUDDOC_CREDENTIALS_PATH") {
        config.clouddoc.credentials_path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("MD2NOTE_CLOUDDOC_TOKEN_STORE_PATH") {
        config.clouddoc.token_store_path = Some(PathBuf::from(val));
    }
    if let Ok(val) = std::env::var("MD2NOTE_CLOUDDOC_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.clouddoc.timeout_seconds = timeout;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("MD2NOTE_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("MD2NOTE_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

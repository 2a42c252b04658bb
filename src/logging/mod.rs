//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels, overridable with `RUST_LOG`
//! - Local JSON file logging with rotation
//! - Per-file pipeline macros with consistent field names
//!
//! # Example
//!
//! ```no_run
//! use md2note::logging::init_logging;
//! use md2note::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of one file's pipeline
///
/// # Example
///
/// ```no_run
/// use md2note::log_file_start;
/// use std::path::Path;
///
/// log_file_start!(Path::new("notes/plan.md"), 1, 3);
/// ```
#[macro_export]
macro_rules! log_file_start {
    ($path:expr, $index:expr, $total:expr) => {
        tracing::info!(
            path = %$path.display(),
            index = $index,
            total = $total,
            "Processing file"
        );
    };
}

/// Log the outcome of one file's pipeline
///
/// Successes are logged at info level, failures at warn level with their
/// error kind.
///
/// # Example
///
/// ```no_run
/// use md2note::log_file_outcome;
/// use md2note::domain::ExportOutcome;
///
/// let outcome = ExportOutcome::success("notes/plan.md");
/// log_file_outcome!(&outcome);
/// ```
#[macro_export]
macro_rules! log_file_outcome {
    ($outcome:expr) => {
        match $outcome.error_kind() {
            None => tracing::info!(
                path = %$outcome.source_path().display(),
                "Exported"
            ),
            Some(kind) => tracing::warn!(
                path = %$outcome.source_path().display(),
                error_kind = kind.as_str(),
                detail = $outcome.error_detail().unwrap_or_default(),
                "Export failed"
            ),
        }
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use md2note::log_error_with_context;
/// use md2note::domain::Md2NoteError;
///
/// let error = Md2NoteError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

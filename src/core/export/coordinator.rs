//! Export coordinator - main orchestrator for a run
//!
//! Drives scan, extract, export and move for every file of a source tree,
//! strictly one file at a time in scan order, and aggregates the outcomes
//! into a [`RunSummary`].

use super::summary::{OutcomeAggregator, RunSummary};
use crate::adapters::exporter::{create_exporter, Exporter};
use crate::config::{ExporterConfig, Md2NoteConfig};
use crate::core::metadata::{MarkdownMetadataExtractor, MetadataExtractor};
use crate::core::mover::{FileMover, FsFileMover};
use crate::core::scan::{validate_source_root, DirectoryScanner, Scanner};
use crate::domain::errors::Md2NoteError;
use crate::domain::{ErrorKind, ExportOutcome, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Run state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Scanning,
    /// 1-based index of the file being processed
    ProcessingFile(usize),
    Finalizing,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Scanning => write!(f, "scanning"),
            RunState::ProcessingFile(i) => write!(f, "processing file {i}"),
            RunState::Finalizing => write!(f, "finalizing"),
            RunState::Done => write!(f, "done"),
        }
    }
}

/// Export coordinator
///
/// Collaborators default to the filesystem implementations and can be
/// replaced with the `with_*` builders.
pub struct ExportCoordinator {
    exporter: Arc<dyn Exporter + Send + Sync>,
    scanner: Option<Arc<dyn Scanner>>,
    extractor: Arc<dyn MetadataExtractor>,
    mover: Arc<dyn FileMover>,
    extensions: Vec<String>,
    state: RunState,
}

impl ExportCoordinator {
    pub fn new(exporter: Arc<dyn Exporter + Send + Sync>) -> Self {
        Self {
            exporter,
            scanner: None,
            extractor: Arc::new(MarkdownMetadataExtractor::new()),
            mover: Arc::new(FsFileMover::new()),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            state: RunState::Idle,
        }
    }

    /// Replaces the default scanner
    ///
    /// A custom scanner is responsible for skipping the clean tree.
    pub fn with_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn MetadataExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_mover(mut self, mover: Arc<dyn FileMover>) -> Self {
        self.mover = mover;
        self
    }

    /// Extensions matched by the default scanner
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Current state of the run
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "Run state change");
        self.state = next;
    }

    /// Execute the export
    ///
    /// Exported files are moved from `source_root` to the same relative
    /// location under `clean_root`, which is created when missing.
    ///
    /// # Errors
    ///
    /// Only run-setup failures are returned: a missing or unreadable source
    /// root, an unusable destination, or a clean root that cannot be
    /// created. Per-file failures are reported in the summary.
    pub async fn execute(&mut self, source_root: &Path, clean_root: &Path) -> Result<RunSummary> {
        let start_time = Instant::now();

        validate_source_root(source_root)?;
        self.exporter.preflight().await?;
        create_clean_root(clean_root)?;

        tracing::info!(
            source = %source_root.display(),
            clean = %clean_root.display(),
            destination = self.exporter.name(),
            "Starting export"
        );

        self.transition(RunState::Scanning);
        let scanner: Arc<dyn Scanner> = match &self.scanner {
            Some(scanner) => scanner.clone(),
            None => Arc::new(DirectoryScanner::new(&self.extensions).exclude(clean_root)),
        };
        let files = scanner.scan(source_root)?;
        tracing::info!(count = files.len(), "Found files to export");

        let mut aggregator = OutcomeAggregator::new();
        let total = files.len();
        for (i, path) in files.iter().enumerate() {
            self.transition(RunState::ProcessingFile(i + 1));
            crate::log_file_start!(path, i + 1, total);

            let outcome = self.process_file(path, source_root, clean_root).await;
            crate::log_file_outcome!(&outcome);
            aggregator.record(outcome);
        }

        self.transition(RunState::Finalizing);
        let summary = aggregator.summarize().with_duration(start_time.elapsed());
        summary.log_summary();

        self.transition(RunState::Done);
        Ok(summary)
    }

    async fn process_file(&self, path: &Path, source_root: &Path, clean_root: &Path) -> ExportOutcome {
        let record = match self.extractor.extract(path) {
            Ok(record) => record,
            Err(e) => {
                return ExportOutcome::failure(path, ErrorKind::MetadataExtraction, e.to_string())
            }
        };

        let outcome = self.exporter.export(&record).await;
        if !outcome.succeeded() {
            return outcome;
        }

        match self.mover.relocate(path, source_root, clean_root) {
            Ok(moved_to) => {
                tracing::debug!(path = %path.display(), moved_to = %moved_to.display(), "Archived");
                outcome
            }
            Err(e) => {
                crate::log_error_with_context!(
                    &e,
                    "Exported but not moved; the destination document exists and the source needs manual cleanup"
                );
                outcome.into_move_failure(e.to_string())
            }
        }
    }
}

/// Runs a complete export of `source_root` with the given configuration
///
/// The clean root defaults to `<source_root>/clean`.
///
/// # Errors
///
/// See [`ExportCoordinator::execute`]; also fails when the configuration
/// does not describe a usable exporter.
pub async fn run(source_root: &Path, config: &Md2NoteConfig) -> Result<RunSummary> {
    let exporter_config = ExporterConfig::from_config(config)?;
    let exporter = create_exporter(&exporter_config)?;
    let clean_root = config.source.clean_dir_for(source_root);

    ExportCoordinator::new(exporter)
        .with_extensions(config.source.extensions.clone())
        .execute(source_root, &clean_root)
        .await
}

fn create_clean_root(clean_root: &Path) -> Result<()> {
    std::fs::create_dir_all(clean_root).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            Md2NoteError::PermissionDenied(clean_root.display().to_string())
        }
        _ => Md2NoteError::Configuration(format!(
            "Cannot create clean directory {}: {e}",
            clean_root.display()
        )),
    })
}

//! Run summary and outcome aggregation
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::ExportOutcome;
use std::collections::BTreeMap;
use std::time::Duration;

/// Summary of one export run
///
/// Invariant: `total_attempted == succeeded + failed` and
/// `failures.len() == failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of files the pipeline processed
    pub total_attempted: usize,

    /// Number of files exported (and moved) successfully
    pub succeeded: usize,

    /// Number of failed files
    pub failed: usize,

    /// Failed outcomes in processing order
    pub failures: Vec<ExportOutcome>,

    /// Duration of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Create a new empty run summary
    pub fn new() -> Self {
        Self {
            total_attempted: 0,
            succeeded: 0,
            failed: 0,
            failures: Vec::new(),
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the run was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code: 0 when every file succeeded, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.is_successful() {
            0
        } else {
            1
        }
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_attempted == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total_attempted as f64) * 100.0
    }

    /// Failure counts per kind
    pub fn failures_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for kind in self.failures.iter().filter_map(ExportOutcome::error_kind) {
            *counts.entry(kind.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total_attempted,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.failures.is_empty() {
            tracing::warn!(failure_count = self.failures.len(), "Export completed with failures");
            for failure in &self.failures {
                tracing::warn!(
                    path = %failure.source_path().display(),
                    error_kind = failure.error_kind().map(|k| k.as_str()).unwrap_or("Unknown"),
                    detail = failure.error_detail().unwrap_or_default(),
                    "Export failure"
                );
            }
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulates per-file outcomes into a [`RunSummary`]
///
/// Purely additive: outcomes are only ever appended.
#[derive(Debug, Default)]
pub struct OutcomeAggregator {
    summary: RunSummary,
}

impl OutcomeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one file
    pub fn record(&mut self, outcome: ExportOutcome) {
        self.summary.total_attempted += 1;
        if outcome.succeeded() {
            self.summary.succeeded += 1;
        } else {
            self.summary.failed += 1;
            self.summary.failures.push(outcome);
        }
    }

    /// Snapshot of everything recorded so far
    ///
    /// Calling this repeatedly without recording in between returns equal
    /// summaries.
    pub fn summarize(&self) -> RunSummary {
        self.summary.clone()
    }
}

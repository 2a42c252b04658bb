//! Export orchestration
//!
//! This module provides the core export logic for MD2Note, including:
//! - Run coordination ([`ExportCoordinator`], [`run`])
//! - Outcome aggregation and the run summary

pub mod coordinator;
pub mod summary;

pub use coordinator::{run, ExportCoordinator, RunState};
pub use summary::{OutcomeAggregator, RunSummary};

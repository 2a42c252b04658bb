//! Core business logic for MD2Note.
//!
//! # Modules
//!
//! - [`scan`] - Source tree scanning
//! - [`metadata`] - Metadata extraction from Markdown files
//! - [`transform`] - Markdown rendering for each destination
//! - [`mover`] - Archiving exported files into the clean tree
//! - [`export`] - Run orchestration and summaries
//!
//! # Export Workflow
//!
//! 1. **Validate**: the source root must exist and be readable
//! 2. **Scan**: find Markdown files, skipping hidden entries and the clean tree
//! 3. **Extract**: build a metadata record from front matter, body and file stats
//! 4. **Export**: create one document at the destination
//! 5. **Move**: archive the source file under the clean root
//! 6. **Report**: summarize every outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use md2note::config::Md2NoteConfig;
//! use md2note::core::export::run;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Md2NoteConfig::default();
//! let summary = run(Path::new("/Users/me/notes"), &config).await?;
//!
//! println!("Total: {}", summary.total_attempted);
//! println!("Succeeded: {}", summary.succeeded);
//! println!("Failed: {}", summary.failed);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod metadata;
pub mod mover;
pub mod scan;
pub mod transform;

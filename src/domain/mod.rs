//! Domain models and types for MD2Note.
//!
//! The domain layer provides:
//! - **Metadata records** ([`MetadataRecord`]) built once per source file
//! - **Export outcomes** ([`ExportOutcome`], [`ErrorKind`]) produced once per file
//! - **Error types** ([`Md2NoteError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T, Md2NoteError>`]. Per-file failures
//! are not propagated past the export pipeline: they are converted into an
//! [`ExportOutcome`] using [`Md2NoteError::kind`].
//!
//! ```rust
//! use md2note::domain::{ErrorKind, ExportOutcome, Md2NoteError};
//!
//! let err = Md2NoteError::Authentication("token expired".to_string());
//! let kind = err.kind().unwrap();
//! let outcome = ExportOutcome::failure("notes/a.md", kind, err.to_string());
//! assert_eq!(outcome.error_kind(), Some(ErrorKind::Authentication));
//! ```

pub mod errors;
pub mod outcome;
pub mod record;
pub mod result;

pub use errors::Md2NoteError;
pub use outcome::{ErrorKind, ExportOutcome};
pub use record::{MetadataRecord, MetadataRecordBuilder};
pub use result::Result;

//! Apple Notes destination
//!
//! - [`bridge`]: the automation bridge trait and its `osascript` implementation
//! - [`memory`]: an in-memory bridge for tests
//! - [`exporter`]: the [`NotesExporter`]

pub mod bridge;
pub mod exporter;
pub mod memory;

pub use bridge::{NotesBridge, OsaScriptBridge};
pub use exporter::NotesExporter;
pub use memory::InMemoryNotesBridge;

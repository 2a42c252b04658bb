//! Markdown rendering for export destinations
//!
//! - [`html`]: HTML note bodies for Apple Notes
//! - [`docs`]: Google Docs `batchUpdate` requests built from the [`blocks`] model
//! - [`file_info`]: the metadata section both renderers append

pub mod blocks;
pub mod docs;
pub mod file_info;
pub mod html;

pub use blocks::{parse_blocks, Block, TextRun};
pub use docs::render_doc_requests;
pub use file_info::{file_info_entries, strip_title_heading};
pub use html::render_note_html;

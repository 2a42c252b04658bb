//! Note body rendering
//!
//! Apple Notes stores rich text as HTML, so the Markdown body is rendered with
//! pulldown-cmark's HTML writer after removing a heading that would repeat
//! the note title.

use super::blocks::markdown_options;
use super::file_info::{file_info_html, strip_title_heading};
use crate::domain::MetadataRecord;
use pulldown_cmark::{html, Parser};

/// Renders the record as a note body
pub fn render_note_html(record: &MetadataRecord, include_file_info: bool) -> String {
    let body = strip_title_heading(record.body(), record.title());

    let mut output = String::with_capacity(body.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(&body, markdown_options()));

    if include_file_info {
        output.push_str(&file_info_html(record.attributes()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetadataRecordBuilder;

    #[test]
    fn test_render_removes_duplicate_title() {
        let record = MetadataRecordBuilder::new("a.md")
            .title("Meeting")
            .body("# Meeting\n\n- one\n- **two**\n")
            .build();

        let html = render_note_html(&record, false);
        assert!(!html.contains("<h1>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<strong>two</strong>"));
    }

    #[test]
    fn test_render_tables_and_code() {
        let record = MetadataRecordBuilder::new("a.md")
            .title("Data")
            .body("| a | b |\n|---|---|\n| 1 | 2 |\n\n```\nlet x = 1;\n```\n")
            .build();

        let html = render_note_html(&record, false);
        assert!(html.contains("<table>"));
        assert!(html.contains("<pre><code>let x = 1;\n</code></pre>"));
    }

    #[test]
    fn test_render_appends_file_info() {
        let record = MetadataRecordBuilder::new("a.md")
            .title("Note")
            .body("Body")
            .filesystem_attribute("filename", "a.md")
            .build();

        let with_info = render_note_html(&record, true);
        assert!(with_info.starts_with("<p>Body</p>"));
        assert!(with_info.contains("<hr>\n<h2>File Info</h2>"));
        assert!(with_info.contains("<b>Filename:</b> a.md"));

        let without_info = render_note_html(&record, false);
        assert!(!without_info.contains("File Info"));
    }
}

//! Cloud document rendering
//!
//! Turns a record into Google Docs `batchUpdate` requests. The full text is
//! inserted with a single `insertText` at index 1; paragraph and text styles
//! are then applied to ranges computed in UTF-16 code units, which is how the
//! Docs API indexes document content.
//!
//! List items carry one leading tab per nesting level. Each run of
//! consecutive items gets a single `createParagraphBullets` request, which
//! turns the tabs into nesting levels and deletes them. Those requests come
//! last and run from the end of the document backwards, so the deleted tabs
//! never shift a range that is still to be applied.

use super::blocks::{parse_blocks, Block, TextRun};
use super::file_info::{file_info_blocks, strip_title_heading};
use crate::domain::MetadataRecord;
use serde_json::{json, Value};

/// Text inserted in place of a horizontal rule
const RULE_TEXT: &str = "────────────────────";

/// Font applied to inline code and code blocks
const CODE_FONT: &str = "Courier New";

/// Indentation of block quotes, in points
const QUOTE_INDENT_PT: u32 = 36;

const BULLET_PRESET: &str = "BULLET_DISC_CIRCLE_SQUARE";
const NUMBERED_PRESET: &str = "NUMBERED_DECIMAL_ALPHA_ROMAN";

/// Consecutive list paragraphs sharing one bullet preset
struct ListRun {
    ordered: bool,
    start: usize,
    end: usize,
}

/// Builds the `batchUpdate` requests for a record
///
/// Returns an empty list when there is no content to insert.
pub fn render_doc_requests(record: &MetadataRecord, include_file_info: bool) -> Vec<Value> {
    let body = strip_title_heading(record.body(), record.title());
    let mut blocks = parse_blocks(&body);
    if include_file_info {
        blocks.extend(file_info_blocks(record.attributes()));
    }
    requests_for_blocks(&blocks)
}

/// Builds requests for an ordered block list
pub fn requests_for_blocks(blocks: &[Block]) -> Vec<Value> {
    let mut text = String::new();
    let mut styles = Vec::new();
    let mut lists: Vec<ListRun> = Vec::new();
    let mut in_list = false;
    // Docs bodies start at index 1
    let mut index = 1usize;

    for block in blocks {
        let (content, prefix) = match block {
            Block::Rule => (RULE_TEXT.to_string(), 0),
            Block::ListItem { depth, .. } => {
                ("\t".repeat(*depth) + &block.plain_text(), *depth)
            }
            other => (other.plain_text(), 0),
        };
        let start = index;
        let end = start + utf16_len(&content);
        // Paragraph ranges include the trailing newline
        let paragraph = (start, end + 1);

        match block {
            Block::Heading { level, .. } => styles.push(json!({
                "updateParagraphStyle": {
                    "range": range(paragraph),
                    "paragraphStyle": { "namedStyleType": format!("HEADING_{}", (*level).clamp(1, 6)) },
                    "fields": "namedStyleType"
                }
            })),
            Block::ListItem { ordered, .. } => match lists.last_mut() {
                Some(list) if in_list && list.ordered == *ordered => list.end = paragraph.1,
                _ => lists.push(ListRun {
                    ordered: *ordered,
                    start: paragraph.0,
                    end: paragraph.1,
                }),
            },
            Block::Quote(_) => styles.push(quote_indent(paragraph)),
            Block::CodeBlock(_) if end > start => styles.push(text_style(
                (start, end),
                json!({ "weightedFontFamily": { "fontFamily": CODE_FONT } }),
                "weightedFontFamily",
            )),
            _ => {}
        }

        in_list = matches!(block, Block::ListItem { .. });
        styles.extend(run_styles(block.runs(), start + prefix));

        text.push_str(&content);
        text.push('\n');
        index = end + 1;
    }

    if text.is_empty() {
        return Vec::new();
    }

    let mut requests = Vec::with_capacity(styles.len() + 1);
    requests.push(json!({
        "insertText": {
            "location": { "index": 1 },
            "text": text
        }
    }));
    requests.extend(styles);
    requests.extend(lists.iter().rev().map(|list| {
        let preset = if list.ordered {
            NUMBERED_PRESET
        } else {
            BULLET_PRESET
        };
        json!({
            "createParagraphBullets": {
                "range": range((list.start, list.end)),
                "bulletPreset": preset
            }
        })
    }));
    requests
}

/// Length of a string in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn run_styles(runs: &[TextRun], start: usize) -> Vec<Value> {
    let mut styles = Vec::new();
    let mut offset = start;

    for run in runs {
        let len = utf16_len(&run.text);
        let span = (offset, offset + len);
        offset += len;

        if len == 0 {
            continue;
        }

        let mut style = serde_json::Map::new();
        let mut fields = Vec::new();
        if run.bold {
            style.insert("bold".to_string(), Value::Bool(true));
            fields.push("bold");
        }
        if run.italic {
            style.insert("italic".to_string(), Value::Bool(true));
            fields.push("italic");
        }
        if run.code {
            style.insert(
                "weightedFontFamily".to_string(),
                json!({ "fontFamily": CODE_FONT }),
            );
            fields.push("weightedFontFamily");
        }

        if !fields.is_empty() {
            styles.push(text_style(span, Value::Object(style), &fields.join(",")));
        }
    }

    styles
}

fn range((start, end): (usize, usize)) -> Value {
    json!({ "startIndex": start, "endIndex": end })
}

fn text_style(span: (usize, usize), style: Value, fields: &str) -> Value {
    json!({
        "updateTextStyle": {
            "range": range(span),
            "textStyle": style,
            "fields": fields
        }
    })
}

fn quote_indent(paragraph: (usize, usize)) -> Value {
    json!({
        "updateParagraphStyle": {
            "range": range(paragraph),
            "paragraphStyle": {
                "indentStart": { "magnitude": QUOTE_INDENT_PT, "unit": "PT" },
                "indentFirstLine": { "magnitude": QUOTE_INDENT_PT, "unit": "PT" }
            },
            "fields": "indentStart,indentFirstLine"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetadataRecordBuilder;

    fn record(title: &str, body: &str) -> MetadataRecord {
        MetadataRecordBuilder::new("a.md").title(title).body(body).build()
    }

    #[test]
    fn test_single_insert_then_styles() {
        let requests = render_doc_requests(&record("T", "## Section\n\nText"), false);

        assert_eq!(requests[0]["insertText"]["location"]["index"], 1);
        assert_eq!(requests[0]["insertText"]["text"], "Section\nText\n");

        let heading = &requests[1]["updateParagraphStyle"];
        assert_eq!(heading["paragraphStyle"]["namedStyleType"], "HEADING_2");
        assert_eq!(heading["range"]["startIndex"], 1);
        assert_eq!(heading["range"]["endIndex"], 9);
        assert_eq!(requests.len(), 2);
    }

    #[test]
    fn test_ranges_use_utf16_units() {
        // The emoji is two UTF-16 code units
        let requests = requests_for_blocks(&[
            Block::Paragraph(vec![TextRun::plain("😀 ")]),
            Block::Paragraph(vec![TextRun {
                text: "bold".to_string(),
                bold: true,
                ..TextRun::default()
            }]),
        ]);

        let style = &requests[1]["updateTextStyle"];
        // "😀 \n" occupies indexes 1..5
        assert_eq!(style["range"]["startIndex"], 5);
        assert_eq!(style["range"]["endIndex"], 9);
        assert_eq!(style["fields"], "bold");
        assert_eq!(style["textStyle"]["bold"], true);
    }

    fn bullets(requests: &[Value]) -> Vec<&Value> {
        requests
            .iter()
            .filter_map(|r| r.get("createParagraphBullets"))
            .collect()
    }

    #[test]
    fn test_consecutive_items_share_one_bullet_request() {
        let requests = render_doc_requests(&record("T", "1. one\n2. two\n"), false);
        let bullets = bullets(&requests);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0]["bulletPreset"], NUMBERED_PRESET);
        // "one\ntwo\n" occupies indexes 1..9
        assert_eq!(bullets[0]["range"]["startIndex"], 1);
        assert_eq!(bullets[0]["range"]["endIndex"], 9);
    }

    #[test]
    fn test_nested_items_use_leading_tabs() {
        let requests =
            render_doc_requests(&record("T", "- top\n  - **inner**\n- next\n"), false);

        assert_eq!(
            requests[0]["insertText"]["text"],
            "top\n\tinner\nnext\n"
        );
        assert!(!requests.iter().any(|r| r.to_string().contains("indentStart")));

        let bullets = bullets(&requests);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0]["bulletPreset"], BULLET_PRESET);
        assert_eq!(bullets[0]["range"]["startIndex"], 1);
        assert_eq!(bullets[0]["range"]["endIndex"], 17);

        // Bold span skips the tab: "top\n" is 1..5, tab at 5, "inner" at 6..11
        let bold = requests
            .iter()
            .find_map(|r| r.get("updateTextStyle"))
            .unwrap();
        assert_eq!(bold["range"]["startIndex"], 6);
        assert_eq!(bold["range"]["endIndex"], 11);
    }

    #[test]
    fn test_separate_lists_apply_last_first_after_styles() {
        let requests = render_doc_requests(
            &record("T", "- a\n- b\n\nBreak\n\n1. c\n"),
            false,
        );

        let first_bullet = requests
            .iter()
            .position(|r| r.get("createParagraphBullets").is_some())
            .unwrap();
        assert!(requests[first_bullet..]
            .iter()
            .all(|r| r.get("createParagraphBullets").is_some()));

        let bullets = bullets(&requests);
        assert_eq!(bullets.len(), 2);
        // "a\nb\nBreak\nc\n": the numbered list at 11..13 comes first
        assert_eq!(bullets[0]["bulletPreset"], NUMBERED_PRESET);
        assert_eq!(bullets[0]["range"]["startIndex"], 11);
        assert_eq!(bullets[1]["bulletPreset"], BULLET_PRESET);
        assert_eq!(bullets[1]["range"]["startIndex"], 1);
        assert_eq!(bullets[1]["range"]["endIndex"], 5);
    }

    #[test]
    fn test_inline_code_uses_monospace() {
        let requests = render_doc_requests(&record("T", "run `cargo`"), false);
        let style = &requests[1]["updateTextStyle"];
        assert_eq!(style["textStyle"]["weightedFontFamily"]["fontFamily"], CODE_FONT);
        assert_eq!(style["range"]["startIndex"], 5);
        assert_eq!(style["range"]["endIndex"], 10);
    }

    #[test]
    fn test_duplicate_title_removed_and_file_info_appended() {
        let record = MetadataRecordBuilder::new("a.md")
            .title("Plan")
            .body("# Plan\n\nSteps")
            .filesystem_attribute("filename", "a.md")
            .build();

        let requests = render_doc_requests(&record, true);
        let text = requests[0]["insertText"]["text"].as_str().unwrap();
        assert!(text.starts_with("Steps\n"));
        assert!(text.contains("File Info\nFilename: a.md\n"));
    }

    #[test]
    fn test_empty_body_produces_no_requests() {
        assert!(render_doc_requests(&record("Title only", ""), false).is_empty());
    }
}

//! File Info section and title de-duplication shared by both renderers

use super::blocks::{Block, TextRun};
use chrono::DateTime;
use std::collections::BTreeMap;

/// Heading of the appended metadata section
pub const FILE_INFO_HEADING: &str = "File Info";

/// Keys rendered with a dedicated label, in display order
const KNOWN_FIELDS: [(&str, &str); 5] = [
    ("filename", "Filename"),
    ("filepath", "File Path"),
    ("modified_time", "Modified"),
    ("created_time", "Created"),
    ("size", "Size"),
];

/// Label/value pairs for the File Info section
///
/// Known file properties come first in a fixed order, then every other
/// attribute in key order with a title-cased label.
pub fn file_info_entries(attributes: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut entries = Vec::with_capacity(attributes.len());

    for (key, label) in KNOWN_FIELDS {
        if let Some(value) = attributes.get(key) {
            let value = match key {
                "modified_time" | "created_time" => format_timestamp(value),
                "size" => format_size(value),
                _ => value.clone(),
            };
            entries.push((label.to_string(), value));
        }
    }

    for (key, value) in attributes {
        if KNOWN_FIELDS.iter().any(|(known, _)| *known == key.as_str()) {
            continue;
        }
        entries.push((title_case(key), value.clone()));
    }

    entries
}

/// File Info section as document blocks, preceded by a rule
pub fn file_info_blocks(attributes: &BTreeMap<String, String>) -> Vec<Block> {
    let entries = file_info_entries(attributes);
    if entries.is_empty() {
        return Vec::new();
    }

    let mut blocks = vec![
        Block::Rule,
        Block::Heading {
            level: 2,
            runs: vec![TextRun::plain(FILE_INFO_HEADING)],
        },
    ];
    blocks.extend(entries.into_iter().map(|(label, value)| Block::ListItem {
        ordered: false,
        depth: 0,
        runs: vec![
            TextRun {
                text: format!("{label}:"),
                bold: true,
                ..TextRun::default()
            },
            TextRun::plain(format!(" {value}")),
        ],
    }));
    blocks
}

/// File Info section as HTML, preceded by a rule
pub fn file_info_html(attributes: &BTreeMap<String, String>) -> String {
    let entries = file_info_entries(attributes);
    if entries.is_empty() {
        return String::new();
    }

    let mut html = format!("<hr>\n<h2>{FILE_INFO_HEADING}</h2>\n<ul>\n");
    for (label, value) in entries {
        html.push_str(&format!(
            "<li><b>{}:</b> {}</li>\n",
            escape_html(&label),
            escape_html(&value)
        ));
    }
    html.push_str("</ul>\n");
    html
}

/// Removes a leading level-1 heading that repeats the title
///
/// Only the first non-blank line is considered, together with the blank
/// lines that follow it.
pub fn strip_title_heading(body: &str, title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return body.to_string();
    }

    let mut lines = body.lines().enumerate().skip_while(|(_, l)| l.trim().is_empty());
    let Some((index, first)) = lines.next() else {
        return body.to_string();
    };

    match first.trim().strip_prefix("# ") {
        Some(heading) if heading.trim() == title => body
            .lines()
            .skip(index + 1)
            .skip_while(|l| l.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => body.to_string(),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn format_timestamp(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => dt.format("%B %d, %Y at %I:%M %p").to_string(),
        Err(_) => value.to_string(),
    }
}

fn format_size(value: &str) -> String {
    match value.parse::<u64>() {
        Ok(bytes) if bytes < 1024 => format!("{bytes} bytes"),
        Ok(bytes) => format!("{:.1} KB", bytes as f64 / 1024.0),
        Err(_) => value.to_string(),
    }
}

fn title_case(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

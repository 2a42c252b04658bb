//! Metadata extraction from Markdown source files
//!
//! Builds a [`MetadataRecord`] from a file's YAML front matter, its body and
//! its filesystem properties.

use crate::domain::errors::Md2NoteError;
use crate::domain::result::Result;
use crate::domain::{MetadataRecord, MetadataRecordBuilder};
use chrono::{DateTime, Local};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Turns a source file into a [`MetadataRecord`]
pub trait MetadataExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns [`Md2NoteError::MetadataExtraction`] when the file cannot be
    /// read or its front matter cannot be parsed.
    fn extract(&self, path: &Path) -> Result<MetadataRecord>;
}

/// Extractor for Markdown files with optional YAML front matter
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownMetadataExtractor;

impl MarkdownMetadataExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for MarkdownMetadataExtractor {
    fn extract(&self, path: &Path) -> Result<MetadataRecord> {
        let content = fs::read_to_string(path).map_err(|e| {
            Md2NoteError::MetadataExtraction(format!("Failed to read {}: {e}", path.display()))
        })?;
        let file_metadata = fs::metadata(path).map_err(|e| {
            Md2NoteError::MetadataExtraction(format!("Failed to stat {}: {e}", path.display()))
        })?;

        let (front_matter, body) = split_front_matter(&content);
        let front_matter = match front_matter {
            Some(yaml) => parse_front_matter(yaml)?,
            None => Vec::new(),
        };

        let title = resolve_title(&content, &front_matter, body, path);

        let mut builder = MetadataRecordBuilder::new(path)
            .title(title)
            .body(body)
            .filesystem_attribute("size", file_metadata.len().to_string());

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            builder = builder.filesystem_attribute("filename", name);
        }
        let absolute = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        builder = builder.filesystem_attribute("filepath", absolute.display().to_string());

        if let Ok(modified) = file_metadata.modified() {
            builder = builder.filesystem_attribute(
                "modified_time",
                DateTime::<Local>::from(modified).to_rfc3339(),
            );
        }
        // Not every filesystem records a creation time
        if let Ok(created) = file_metadata.created() {
            builder = builder.filesystem_attribute(
                "created_time",
                DateTime::<Local>::from(created).to_rfc3339(),
            );
        }

        for (key, value) in front_matter {
            builder = builder.front_matter_attribute(key, value);
        }

        Ok(builder.build())
    }
}

/// Splits a leading `---` delimited front-matter block from the body
///
/// Returns `(None, content)` when there is no complete block.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let content_start = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(after_open) = content_start
        .strip_prefix("---\n")
        .or_else(|| content_start.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, content)
}

/// Parses front matter into stringified key/value pairs
///
/// Scalars are rendered as text, sequences joined with `", "` and nested
/// mappings as compact JSON.
fn parse_front_matter(yaml: &str) -> Result<Vec<(String, String)>> {
    let value: Value = serde_yaml::from_str(yaml)?;

    let mapping = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(Md2NoteError::MetadataExtraction(
                "Front matter must be a mapping of keys to values".to_string(),
            ))
        }
    };

    let mut attributes = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s,
            other => scalar_to_string(&other).unwrap_or_default(),
        };
        if key.is_empty() {
            continue;
        }
        attributes.push((key, stringify(&value)?));
    }
    Ok(attributes)
}

fn stringify(value: &Value) -> Result<String> {
    if let Some(s) = scalar_to_string(value) {
        return Ok(s);
    }
    match value {
        Value::Sequence(items) => {
            let parts = items.iter().map(stringify).collect::<Result<Vec<_>>>()?;
            Ok(parts.join(", "))
        }
        Value::Tagged(tagged) => stringify(&tagged.value),
        other => serde_json::to_string(other)
            .map_err(|e| Md2NoteError::MetadataExtraction(format!("Unsupported front matter value: {e}"))),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Title precedence: front-matter `title`, then the first level-1 heading
/// among the leading headings of the body, then the file stem
///
/// An empty file has an empty title so that it is rejected downstream.
fn resolve_title(
    content: &str,
    front_matter: &[(String, String)],
    body: &str,
    path: &Path,
) -> String {
    if let Some((_, title)) = front_matter
        .iter()
        .find(|(k, v)| k == "title" && !v.trim().is_empty())
    {
        return title.trim().to_string();
    }

    if let Some(heading) = leading_h1(body) {
        return heading;
    }

    if content.trim().is_empty() {
        return String::new();
    }

    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn leading_h1(body: &str) -> Option<String> {
    for line in body.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if let Some(heading) = line.strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
            continue;
        }
        if !line.starts_with('#') {
            break;
        }
    }
    None
}

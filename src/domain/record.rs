//! Metadata record domain model
//!
//! A [`MetadataRecord`] is the normalized view of one Markdown source file that
//! every exporter consumes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Normalized title, body and attributes of one source file
///
/// Records are immutable once built. Attributes are kept sorted by key so
/// rendered metadata sections are stable between runs.
///
/// # Examples
///
/// ```
/// use md2note::domain::MetadataRecordBuilder;
///
/// let record = MetadataRecordBuilder::new("/notes/meeting.md")
///     .title("Meeting")
///     .body("Agenda")
///     .filesystem_attribute("title", "meeting")
///     .front_matter_attribute("title", "Weekly Meeting")
///     .build();
///
/// assert_eq!(record.attribute("title"), Some("Weekly Meeting"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    title: String,
    body: String,
    attributes: BTreeMap<String, String>,
    source_path: PathBuf,
}

impl MetadataRecord {
    /// Creates a new builder for the given source path
    pub fn builder(source_path: impl Into<PathBuf>) -> MetadataRecordBuilder {
        MetadataRecordBuilder::new(source_path)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Markdown body with any front-matter block removed
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// True when there is nothing to export
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Builder for [`MetadataRecord`]
///
/// Front-matter attributes always win over filesystem-derived attributes for
/// the same key, whatever order they are added in.
#[derive(Debug, Default)]
pub struct MetadataRecordBuilder {
    source_path: PathBuf,
    title: String,
    body: String,
    filesystem: BTreeMap<String, String>,
    front_matter: BTreeMap<String, String>,
}

impl MetadataRecordBuilder {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds an attribute derived from file properties
    pub fn filesystem_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filesystem.insert(key.into(), value.into());
        self
    }

    /// Adds an attribute declared in the file's front matter
    pub fn front_matter_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.front_matter.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> MetadataRecord {
        let mut attributes = self.filesystem;
        attributes.extend(self.front_matter);

        MetadataRecord {
            title: self.title,
            body: self.body,
            attributes,
            source_path: self.source_path,
        }
    }
}

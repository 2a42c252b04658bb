//! Markdown to block model
//!
//! Flattens the pulldown-cmark event stream into an ordered list of
//! [`Block`]s: the structure the cloud document renderer turns into API
//! requests. Inline formatting is kept as [`TextRun`] flags.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Parser options shared by every renderer
pub fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// A span of text with uniform inline formatting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn is_plain(&self) -> bool {
        !self.bold && !self.italic && !self.code
    }
}

/// One block-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Heading with level 1 to 6
    Heading { level: u8, runs: Vec<TextRun> },
    Paragraph(Vec<TextRun>),
    /// List item; `depth` starts at 0 for top-level items
    ListItem {
        ordered: bool,
        depth: usize,
        runs: Vec<TextRun>,
    },
    CodeBlock(String),
    Quote(Vec<TextRun>),
    Rule,
}

impl Block {
    /// Text content without formatting
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph(runs)
            | Block::ListItem { runs, .. }
            | Block::Quote(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
            Block::CodeBlock(code) => code.trim_end_matches('\n').to_string(),
            Block::Rule => String::new(),
        }
    }

    /// Formatting runs, empty for code blocks and rules
    pub fn runs(&self) -> &[TextRun] {
        match self {
            Block::Heading { runs, .. }
            | Block::Paragraph(runs)
            | Block::ListItem { runs, .. }
            | Block::Quote(runs) => runs,
            Block::CodeBlock(_) | Block::Rule => &[],
        }
    }
}

/// Parses Markdown into blocks in document order
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in Parser::new_ext(markdown, markdown_options()) {
        builder.handle(event);
    }
    builder.finish()
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    runs: Vec<TextRun>,
    strong: usize,
    emphasis: usize,
    quote_depth: usize,
    /// Ordered flag per open list
    lists: Vec<bool>,
    heading: Option<u8>,
    code: Option<String>,
    table_row: Option<Vec<String>>,
    link_target: Option<String>,
}

impl BlockBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some(code) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text, false);
                }
            }
            Event::Code(code) => self.push_text(&code, true),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::Rule => {
                self.flush_runs();
                self.blocks.push(Block::Rule);
            }
            Event::TaskListMarker(done) => {
                self.push_text(if done { "[x] " } else { "[ ] " }, false);
            }
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html, false),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_runs();
                self.heading = Some(heading_level(level));
            }
            Tag::List(start) => {
                // Text of the enclosing item goes before its nested list
                self.flush_runs();
                self.lists.push(start.is_some());
            }
            Tag::CodeBlock(_) => {
                self.flush_runs();
                self.code = Some(String::new());
            }
            Tag::BlockQuote => {
                self.flush_runs();
                self.quote_depth += 1;
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::Link { dest_url, .. } => self.link_target = Some(dest_url.to_string()),
            Tag::TableRow | Tag::TableHead => self.table_row = Some(Vec::new()),
            Tag::TableCell => {
                self.runs.clear();
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let runs = std::mem::take(&mut self.runs);
                let level = self.heading.take().unwrap_or(1);
                if !runs.is_empty() {
                    self.blocks.push(Block::Heading { level, runs });
                }
            }
            TagEnd::Paragraph | TagEnd::Item => self.flush_runs(),
            TagEnd::List(_) => {
                self.flush_runs();
                self.lists.pop();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    self.blocks.push(Block::CodeBlock(code));
                }
            }
            TagEnd::BlockQuote => {
                self.flush_runs();
                self.quote_depth = self.quote_depth.saturating_sub(1);
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Link => {
                if let Some(target) = self.link_target.take() {
                    self.push_text(&format!(" ({target})"), false);
                }
            }
            TagEnd::TableCell => {
                let cell: String = self.runs.drain(..).map(|r| r.text).collect();
                if let Some(row) = self.table_row.as_mut() {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableRow | TagEnd::TableHead => {
                if let Some(row) = self.table_row.take() {
                    self.blocks
                        .push(Block::Paragraph(vec![TextRun::plain(row.join(" | "))]));
                }
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        if text.is_empty() {
            return;
        }
        let run = TextRun {
            text: text.to_string(),
            bold: self.strong > 0,
            italic: self.emphasis > 0,
            code,
        };

        // Merge with the previous run when formatting is identical
        if let Some(last) = self.runs.last_mut() {
            if last.bold == run.bold && last.italic == run.italic && last.code == run.code {
                last.text.push_str(&run.text);
                return;
            }
        }
        self.runs.push(run);
    }

    fn flush_runs(&mut self) {
        if self.runs.is_empty() {
            return;
        }
        let runs = std::mem::take(&mut self.runs);
        if runs.iter().all(|r| r.is_plain() && r.text.trim().is_empty()) {
            return;
        }

        let block = if let Some(&ordered) = self.lists.last() {
            Block::ListItem {
                ordered,
                depth: self.lists.len() - 1,
                runs,
            }
        } else if self.quote_depth > 0 {
            Block::Quote(runs)
        } else {
            Block::Paragraph(runs)
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_runs();
        if let Some(code) = self.code.take() {
            self.blocks.push(Block::CodeBlock(code));
        }
        self.blocks
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

//! Markdown page parser.

use std::fs;
use std::path::{Path, PathBuf};

use pulldown_cmark::{Options, Parser, html};

use crate::blocks::{self, BlockExtension, Callout, Foldout};
use crate::frontmatter::{Metadata, MetadataError, split_front_matter};
use crate::heading::{HeadingIds, link_headings};
use crate::placeholder::Placeholders;

/// Result of parsing one Markdown document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedPage {
    /// HTML fragment converted from the document body.
    pub html: String,
    /// Front matter metadata (empty when the document has none).
    pub metadata: Metadata,
}

/// Error returned when a source document cannot be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Source file missing or unreadable.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Front matter is malformed.
    #[error("Invalid front matter in {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
}

/// Markdown parser with the documentation extension set.
///
/// The parser holds no per-document state and can be shared across threads.
pub struct MarkdownParser {
    blocks: Vec<Box<dyn BlockExtension>>,
}

impl MarkdownParser {
    /// Create a parser with callouts and foldouts enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_block(Callout).with_block(Foldout)
    }

    /// Create a parser without block extensions.
    #[must_use]
    pub fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Register a block extension.
    ///
    /// Extensions are tried in registration order; the first to recognise an
    /// opening line handles the block.
    #[must_use]
    pub fn with_block<E: BlockExtension + 'static>(mut self, extension: E) -> Self {
        self.blocks.push(Box::new(extension));
        self
    }

    /// pulldown-cmark options shared by every document.
    ///
    /// Fenced code blocks are part of `CommonMark` and need no flag.
    #[must_use]
    pub fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_DEFINITION_LIST
            | Options::ENABLE_HEADING_ATTRIBUTES
    }

    /// Parse a document held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the front matter is malformed.
    pub fn parse(&self, text: &str) -> Result<ParsedPage, MetadataError> {
        let split = split_front_matter(text);
        let metadata = split.metadata()?;
        let mut ids = HeadingIds::default();
        let html = self.render_body(split.body, &mut ids);
        Ok(ParsedPage { html, metadata })
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Read`] if the file cannot be read and
    /// [`ParseError::Metadata`] if its front matter is malformed.
    pub fn parse_file(&self, path: &Path) -> Result<ParsedPage, ParseError> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(&text).map_err(|source| ParseError::Metadata {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Convert a Markdown body (no front matter) to HTML.
    fn render_body(&self, markdown: &str, ids: &mut HeadingIds) -> String {
        let mut placeholders = Placeholders::new();
        let prepared = blocks::expand(markdown, &self.blocks, &mut placeholders, &mut |body| {
            self.render_body(body, ids)
        });

        let parser = Parser::new_ext(&prepared, Self::options());
        let events = link_headings(parser, ids);

        let mut output = String::with_capacity(prepared.len() * 3 / 2);
        html::push_html(&mut output, events.into_iter());
        placeholders.apply(&mut output);
        output
    }
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a Markdown file with the default extension set.
///
/// # Errors
///
/// See [`MarkdownParser::parse_file`].
pub fn parse_page(path: &Path) -> Result<ParsedPage, ParseError> {
    MarkdownParser::new().parse_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(markdown: &str) -> ParsedPage {
        MarkdownParser::new().parse(markdown).unwrap()
    }

    #[test]
    fn test_no_front_matter_gives_empty_metadata() {
        let page = parse("Hello *world*\n");
        assert!(page.metadata.is_empty());
        assert_eq!(page.html, "<p>Hello <em>world</em></p>\n");
    }

    #[test]
    fn test_front_matter_is_not_rendered() {
        let page = parse("---\ntitle: Home\nversion: 2\n---\nBody\n");
        assert_eq!(page.metadata["title"], json!("Home"));
        assert_eq!(page.metadata["version"], json!(2));
        assert_eq!(page.html, "<p>Body</p>\n");
    }

    #[test]
    fn test_malformed_front_matter() {
        let err = MarkdownParser::new()
            .parse("---\ntitle: [oops\n---\nBody")
            .unwrap_err();
        assert!(matches!(err, MetadataError::Parse(_)));
    }

    #[test]
    fn test_tables() {
        let page = parse("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(page.html.contains("<table>"));
        assert!(page.html.contains("<td>1</td>"));
    }

    #[test]
    fn test_fenced_code() {
        let page = parse("```yaml\nkey: value\n```\n");
        assert!(
            page.html
                .contains("<pre><code class=\"language-yaml\">key: value\n</code></pre>")
        );
    }

    #[test]
    fn test_definition_list() {
        let page = parse("Charm\n: A package of operations code\n");
        assert!(page.html.contains("<dl>"));
        assert!(page.html.contains("<dt>Charm</dt>"));
        assert!(page.html.contains("<dd>"));
        assert!(page.html.contains("A package of operations code"));
    }

    #[test]
    fn test_heading_attribute_list() {
        let page = parse("## Setup {#setup .wide}\n");
        assert!(page.html.contains("id=\"setup\""));
        assert!(page.html.contains("class=\"wide\""));
    }

    #[test]
    fn test_heading_anchor() {
        let page = parse("# Getting started\n");
        assert_eq!(
            page.html,
            "<h1 id=\"getting-started\"><a class=\"anchor\" href=\"#getting-started\">Getting started</a></h1>\n"
        );
    }

    #[test]
    fn test_callout() {
        let page = parse("Before\n\n!!! Note: Read this.\n    More **detail**.\n\nAfter\n");
        assert!(page.html.starts_with("<p>Before</p>\n"));
        assert!(page.html.contains("<div class=\"p-notification--note\">"));
        assert!(
            page.html
                .contains("<span class=\"p-notification__status\">Note:</span>\n<p>Read this.</p>\n<p>More <strong>detail</strong>.</p>\n</div>")
        );
        assert!(page.html.ends_with("<p>After</p>\n"));
    }

    #[test]
    fn test_foldout() {
        let page = parse("^# Details\n    Hidden text\n");
        assert!(page.html.contains("<details class=\"p-foldout\">"));
        assert!(page.html.contains("<summary class=\"p-foldout__heading\">Details</summary>"));
        assert!(page.html.contains("<p>Hidden text</p>"));
        assert!(!page.html.contains("docbuild-block"));
    }

    #[test]
    fn test_callout_inside_foldout() {
        let page = parse("^# Outer\n    !!! Warning:\n        Inner body\n");
        let details = page.html.find("<details").unwrap();
        let callout = page.html.find("p-notification--warning").unwrap();
        let inner = page.html.find("<p>Inner body</p>").unwrap();
        assert!(details < callout && callout < inner);
        assert!(!page.html.contains("docbuild-block"));
    }

    #[test]
    fn test_heading_ids_unique_across_blocks() {
        let page = parse("^# Fold\n    # Usage\n\n# Usage\n");
        assert!(page.html.contains("id=\"usage\""));
        assert!(page.html.contains("id=\"usage_1\""));
    }

    #[test]
    fn test_callout_syntax_in_code_is_literal() {
        let page = parse("```\n!!! Note:\n    text\n```\n");
        assert!(page.html.contains("!!! Note:"));
        assert!(!page.html.contains("p-notification"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let markdown = "# A\n\n!!! Note: x\n\n^# B\n    y\n";
        assert_eq!(parse(markdown), parse(markdown));
    }

    #[test]
    fn test_empty_parser_leaves_block_syntax() {
        let page = MarkdownParser::empty().parse("^# Title\n").unwrap();
        assert_eq!(page.html, "<p>^# Title</p>\n");
    }

    #[test]
    fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, "---\ntitle: File\n---\nText\n").unwrap();

        let page = parse_page(&path).unwrap();
        assert_eq!(page.metadata["title"], json!("File"));
        assert_eq!(page.html, "<p>Text</p>\n");
    }

    #[test]
    fn test_parse_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = parse_page(&path).unwrap_err();
        assert!(matches!(err, ParseError::Read { .. }));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_parse_file_bad_metadata_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, "---\n- not\n- a mapping\n---\n").unwrap();

        let err = parse_page(&path).unwrap_err();
        assert!(matches!(err, ParseError::Metadata { .. }));
        assert!(err.to_string().contains("bad.md"));
    }
}

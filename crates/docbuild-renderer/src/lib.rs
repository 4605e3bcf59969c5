//! Markdown page parser for docbuild.
//!
//! Converts one Markdown document, with an optional YAML front-matter block,
//! into an HTML fragment plus a metadata mapping.
//!
//! # Extensions
//!
//! Every document is converted with the same fixed extension set:
//! - YAML front matter (document metadata)
//! - Tables, fenced code blocks, definition lists
//! - Heading attribute lists (`# Title {#id .class}`)
//! - Heading ids for tables of contents, with anchor links
//! - Callouts (`!!! Note:`) and foldouts (`^# Title`), see [`blocks`]
//!
//! # Example
//!
//! ```
//! use docbuild_renderer::MarkdownParser;
//!
//! let page = MarkdownParser::new()
//!     .parse("---\ntitle: Home\n---\n# Welcome\n")
//!     .unwrap();
//!
//! assert_eq!(page.metadata["title"], "Home");
//! assert!(page.html.contains(r#"<h1 id="welcome">"#));
//! ```

pub mod blocks;
mod frontmatter;
mod heading;
mod placeholder;
mod renderer;
mod util;

pub use frontmatter::{FrontMatter, Metadata, MetadataError, split_front_matter};
pub use renderer::{MarkdownParser, ParseError, ParsedPage, parse_page};
pub use util::{escape_html, slugify};

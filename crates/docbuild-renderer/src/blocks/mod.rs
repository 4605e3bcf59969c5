//! Indented block extensions: callouts and foldouts.
//!
//! A block starts with an opening line at column zero, recognised by a
//! [`BlockExtension`], and continues with every following line indented by
//! four spaces (or a tab). Blank lines inside the body are kept; the block ends
//! at the first non-blank line that is not indented.
//!
//! ```text
//! !!! Note: Charms are cached.
//!     Run `juju refresh` to fetch a newer revision.
//!
//! ^# Advanced options
//!     These settings are rarely needed.
//! ```
//!
//! The body is rendered as Markdown on its own, so blocks may nest. Opening
//! lines inside fenced code blocks are ignored.

mod callout;
mod fence;
mod foldout;

pub use callout::Callout;
pub use foldout::Foldout;

use crate::placeholder::Placeholders;
use fence::FenceTracker;

/// Parsed opening line of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    /// Block label: the callout kind or the foldout title.
    pub label: String,
    /// Markdown written on the opening line after the label, rendered as the
    /// first paragraph of the body.
    pub lead: Option<String>,
}

/// Handler for one kind of indented block.
///
/// Handlers are stateless and shared between threads, so a single parser can
/// convert many documents concurrently.
///
/// # Example
///
/// ```
/// use docbuild_renderer::MarkdownParser;
/// use docbuild_renderer::blocks::{BlockExtension, Opening};
///
/// struct Aside;
///
/// impl BlockExtension for Aside {
///     fn open(&self, line: &str) -> Option<Opening> {
///         let label = line.strip_prefix(">>> ")?;
///         Some(Opening { label: label.trim().to_owned(), lead: None })
///     }
///
///     fn render(&self, opening: &Opening, body_html: &str) -> String {
///         format!("<aside title=\"{}\">\n{body_html}</aside>\n", opening.label)
///     }
/// }
///
/// let parser = MarkdownParser::empty().with_block(Aside);
/// let page = parser.parse(">>> Tip\n    Body text\n").unwrap();
/// assert!(page.html.contains("<aside title=\"Tip\">\n<p>Body text</p>\n</aside>"));
/// ```
pub trait BlockExtension: Send + Sync {
    /// Recognise an opening line (without trailing newline).
    fn open(&self, line: &str) -> Option<Opening>;

    /// Produce the final HTML for a block from its rendered body.
    fn render(&self, opening: &Opening, body_html: &str) -> String;
}

/// Replace every block in `markdown` with a placeholder marker.
///
/// `render_body` converts a block body to HTML; the result is passed through
/// the matching extension and parked in `placeholders`.
pub(crate) fn expand(
    markdown: &str,
    extensions: &[Box<dyn BlockExtension>],
    placeholders: &mut Placeholders,
    render_body: &mut dyn FnMut(&str) -> String,
) -> String {
    if extensions.is_empty() {
        return markdown.to_owned();
    }

    let lines: Vec<&str> = markdown.lines().collect();
    let mut output = String::with_capacity(markdown.len());
    let mut fence = FenceTracker::default();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        fence.update(line);

        let opened = if fence.in_fence() {
            None
        } else {
            extensions
                .iter()
                .find_map(|ext| ext.open(line).map(|opening| (ext, opening)))
        };

        let Some((extension, opening)) = opened else {
            output.push_str(line);
            output.push('\n');
            idx += 1;
            continue;
        };

        let (body_lines, consumed) = collect_body(&lines[idx + 1..]);
        let mut body = String::new();
        if let Some(lead) = &opening.lead {
            body.push_str(lead);
            body.push_str("\n\n");
        }
        body.push_str(&body_lines.join("\n"));

        let html = extension.render(&opening, &render_body(&body));
        let marker = placeholders.insert(html);

        // Surround the marker with blank lines so it forms its own HTML block.
        output.push('\n');
        output.push_str(&marker);
        output.push_str("\n\n");

        idx += 1 + consumed;
    }

    output
}

/// Collect indented body lines, dedented by one level.
///
/// Returns the body and the number of input lines it spans. Trailing blank
/// lines are left for the surrounding document.
fn collect_body<'a>(lines: &[&'a str]) -> (Vec<&'a str>, usize) {
    let mut body = Vec::new();
    let mut content_end = 0;

    for line in lines {
        if line.trim().is_empty() {
            body.push("");
            continue;
        }
        let Some(dedented) = strip_indent(line) else {
            break;
        };
        body.push(dedented);
        content_end = body.len();
    }

    body.truncate(content_end);
    (body, content_end)
}

fn strip_indent(line: &str) -> Option<&str> {
    line.strip_prefix("    ")
        .or_else(|| line.strip_prefix('\t'))
}

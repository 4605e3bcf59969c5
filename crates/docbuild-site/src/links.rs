//! Link repair passes over rendered HTML.
//!
//! Both passes work on markup text rather than a parsed DOM and are idempotent:
//! running them again on their own output changes nothing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `href` attribute with a double- or single-quoted value.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href=(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Characters after which a media path starts a URL.
const MEDIA_ANCHORS: [char; 4] = ['"', '\'', '(', '='];

/// How links to other Markdown pages are rewritten.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkStyle {
    /// `guide.md` becomes `guide.html`.
    #[default]
    Html,
    /// `guide.md` becomes `guide`, for servers mapping clean URLs to files.
    Clean,
}

impl LinkStyle {
    fn replacement(self) -> &'static str {
        match self {
            Self::Html => ".html",
            Self::Clean => "",
        }
    }
}

/// Rewrite `.md` links in `href` attributes to match the output pages.
///
/// Values starting with `http` (after leading spaces) are external and left
/// alone. The `.md` suffix is recognised at the end of the path part, before
/// any `#fragment` or `?query`.
#[must_use]
pub fn rewrite_md_links(html: &str, style: LinkStyle) -> Cow<'_, str> {
    HREF_RE.replace_all(html, |caps: &Captures<'_>| {
        let (value, quote) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (m.as_str(), '"'),
            (None, Some(m)) => (m.as_str(), '\''),
            (None, None) => return caps[0].to_owned(),
        };
        match rewrite_href(value, style) {
            Some(value) => format!("href={quote}{value}{quote}"),
            None => caps[0].to_owned(),
        }
    })
}

fn rewrite_href(value: &str, style: LinkStyle) -> Option<String> {
    if value.trim_start_matches(' ').starts_with("http") {
        return None;
    }
    let split = value.find(['#', '?']).unwrap_or(value.len());
    let (path, suffix) = value.split_at(split);
    let stem = path.strip_suffix(".md")?;
    Some(format!("{stem}{}{suffix}", style.replacement()))
}

/// Replace references to the source media directory with `new`.
///
/// An occurrence of `old` is rewritten only when it starts a URL (it follows a
/// quote, `(` or `=`, optionally with a `./` in between) and is followed by
/// `/`. A leading `./` is dropped with it. Nothing happens when `old` equals
/// `new`.
#[must_use]
pub fn rewrite_media_links<'a>(html: &'a str, old: &str, new: &str) -> Cow<'a, str> {
    if old.is_empty() || old == new {
        return Cow::Borrowed(html);
    }

    let mut output = String::new();
    let mut copied = 0;
    for (start, _) in html.match_indices(old) {
        if start < copied {
            continue;
        }
        let end = start + old.len();
        if !html[end..].starts_with('/') {
            continue;
        }
        let Some(replace_from) = anchored_start(&html[..start]) else {
            continue;
        };
        if output.is_empty() {
            output.reserve(html.len() + new.len());
        }
        output.push_str(&html[copied..replace_from]);
        output.push_str(new);
        copied = end;
    }

    if copied == 0 {
        Cow::Borrowed(html)
    } else {
        output.push_str(&html[copied..]);
        Cow::Owned(output)
    }
}

/// Byte offset where the replacement begins, if `before` ends at a URL start.
fn anchored_start(before: &str) -> Option<usize> {
    if before.ends_with(MEDIA_ANCHORS) {
        return Some(before.len());
    }
    let dotted = before.strip_suffix("./")?;
    dotted.ends_with(MEDIA_ANCHORS).then_some(dotted.len())
}

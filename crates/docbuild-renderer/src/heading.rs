//! Heading ids and anchor links.
//!
//! Every heading receives an `id` (explicit `{#id}` attributes win, otherwise
//! the id is slugified from the heading text) and its content is wrapped in a
//! self-link so readers can copy a link to any section.

use std::collections::HashSet;

use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

use crate::util::{escape_html, slugify};

/// Fallback id for headings whose text has no word characters.
const EMPTY_SLUG: &str = "section";

/// Ids already used in a document, shared across nested block bodies.
#[derive(Debug, Default)]
pub(crate) struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    /// Reserve an explicit id, suffixing it if an earlier heading already took it.
    fn reserve(&mut self, id: &str) -> String {
        if self.used.insert(id.to_owned()) {
            return id.to_owned();
        }
        let unique = self.unique(id);
        tracing::warn!(id, renamed = %unique, "Duplicate heading id");
        unique
    }

    /// Return a unique id derived from `base`, suffixing `_1`, `_2`, ... on collision.
    fn unique(&mut self, base: &str) -> String {
        let base = if base.is_empty() { EMPTY_SLUG } else { base };
        if self.used.insert(base.to_owned()) {
            return base.to_owned();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}_{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Assign ids to headings and wrap their content in anchor links.
pub(crate) fn link_headings<'a>(
    events: impl Iterator<Item = Event<'a>>,
    ids: &mut HeadingIds,
) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    // (heading start tag, buffered inner events)
    let mut current: Option<(Tag<'a>, Vec<Event<'a>>)> = None;

    for event in events {
        match event {
            Event::Start(tag @ Tag::Heading { .. }) => {
                current = Some((tag, Vec::new()));
            }
            Event::End(TagEnd::Heading(level)) => {
                let Some((tag, inner)) = current.take() else {
                    out.push(Event::End(TagEnd::Heading(level)));
                    continue;
                };
                emit_heading(tag, inner, ids, &mut out);
                out.push(Event::End(TagEnd::Heading(level)));
            }
            other => match current.as_mut() {
                Some((_, inner)) => inner.push(other),
                None => out.push(other),
            },
        }
    }

    out
}

fn emit_heading<'a>(
    tag: Tag<'a>,
    inner: Vec<Event<'a>>,
    ids: &mut HeadingIds,
    out: &mut Vec<Event<'a>>,
) {
    let Tag::Heading {
        level,
        id,
        classes,
        attrs,
    } = tag
    else {
        return;
    };

    let id = match id {
        Some(explicit) => ids.reserve(&explicit),
        None => ids.unique(&slugify(&heading_text(&inner))),
    };

    let anchor = format!(r##"<a class="anchor" href="#{}">"##, escape_html(&id));
    out.push(Event::Start(Tag::Heading {
        level,
        id: Some(CowStr::from(id)),
        classes,
        attrs,
    }));
    out.push(Event::InlineHtml(CowStr::from(anchor)));
    out.extend(inner);
    out.push(Event::InlineHtml(CowStr::Borrowed("</a>")));
}

/// Plain text of a heading, used for slug generation.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Options, Parser, html};

    fn render(markdown: &str) -> String {
        let mut ids = HeadingIds::default();
        let parser = Parser::new_ext(markdown, Options::ENABLE_HEADING_ATTRIBUTES);
        let events = link_headings(parser, &mut ids);
        let mut out = String::new();
        html::push_html(&mut out, events.into_iter());
        out
    }

    #[test]
    fn test_heading_gets_slug_id_and_anchor() {
        let html = render("## Hello World");
        assert_eq!(
            html,
            "<h2 id=\"hello-world\"><a class=\"anchor\" href=\"#hello-world\">Hello World</a></h2>\n"
        );
    }

    #[test]
    fn test_explicit_id_kept() {
        let html = render("# Setup {#install}");
        assert!(html.contains(r#"<h1 id="install">"#));
        assert!(html.contains(r##"href="#install""##));
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let html = render("# Usage\n\n# Usage\n\n# Usage");
        assert!(html.contains(r#"id="usage""#));
        assert!(html.contains(r#"id="usage_1""#));
        assert!(html.contains(r#"id="usage_2""#));
    }

    #[test]
    fn test_explicit_id_reserves_slug() {
        let html = render("# Other {#usage}\n\n# Usage");
        assert!(html.contains(r#"id="usage_1""#));
    }

    #[test]
    fn test_explicit_id_after_same_slug_is_suffixed() {
        let html = render("# Usage\n\n# Other {#usage}");
        assert!(html.contains(r##"<h1 id="usage"><a class="anchor" href="#usage">Usage"##));
        assert!(html.contains(r##"<h1 id="usage_1"><a class="anchor" href="#usage_1">Other"##));
    }

    #[test]
    fn test_code_in_heading_contributes_to_slug() {
        let html = render("# Run `make`");
        assert!(html.contains(r#"id="run-make""#));
        assert!(html.contains("<code>make</code>"));
    }

    #[test]
    fn test_punctuation_only_heading() {
        let html = render("# ???");
        assert!(html.contains(r#"id="section""#));
    }

    #[test]
    fn test_non_heading_events_untouched() {
        let html = render("Plain *text*");
        assert_eq!(html, "<p>Plain <em>text</em></p>\n");
    }
}

//! Placeholders for block extension output.
//!
//! Block extensions render their HTML before the surrounding document is
//! parsed. The finished HTML is parked behind an HTML comment marker, which
//! pulldown-cmark passes through verbatim, and swapped back in after the
//! document has been rendered.

/// Collects rendered blocks and the markers standing in for them.
#[derive(Debug, Default)]
pub(crate) struct Placeholders {
    items: Vec<(String, String)>,
}

impl Placeholders {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Park `html` and return the marker to emit in its place.
    pub(crate) fn insert(&mut self, html: String) -> String {
        let marker = format!("<!-- docbuild-block-{} -->", self.items.len());
        self.items.push((marker.clone(), html));
        marker
    }

    /// Replace every marker in `html` with its parked block.
    pub(crate) fn apply(self, html: &mut String) {
        for (marker, block) in self.items {
            if html.contains(&marker) {
                *html = html.replace(&marker, &block);
            }
        }
    }
}

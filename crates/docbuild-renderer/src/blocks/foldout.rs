//! Foldouts: collapsible sections.
//!
//! ```text
//! ^# Supported clouds
//!     - AWS
//!     - Azure
//! ```

use super::{BlockExtension, Opening};
use crate::util::escape_html;

/// Handler for `^# Title` blocks, rendered as `<details>` elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Foldout;

impl BlockExtension for Foldout {
    fn open(&self, line: &str) -> Option<Opening> {
        let rest = line.strip_prefix('^')?;
        if !rest.starts_with('#') {
            return None;
        }
        let title = rest.trim_start_matches('#').trim();
        if title.is_empty() {
            return None;
        }
        Some(Opening {
            label: title.to_owned(),
            lead: None,
        })
    }

    fn render(&self, opening: &Opening, body_html: &str) -> String {
        format!(
            "<details class=\"p-foldout\">\n\
             <summary class=\"p-foldout__heading\">{}</summary>\n\
             <div class=\"p-foldout__content\">\n\
             {body_html}</div>\n\
             </details>\n",
            escape_html(&opening.label)
        )
    }
}

//! Callouts: visually distinct notification blocks.
//!
//! ```text
//! !!! Warning: Upgrades are one-way.
//!     Back up the controller before running `juju upgrade-controller`.
//! ```

use super::{BlockExtension, Opening};

/// Handler for `!!! Kind: text` blocks.
///
/// The kind becomes a CSS modifier (`p-notification--warning`) and is shown as
/// the status label; any text after it starts the callout body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Callout;

impl BlockExtension for Callout {
    fn open(&self, line: &str) -> Option<Opening> {
        let rest = line.strip_prefix("!!!")?.trim();
        let (first, remainder) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));

        let kind = first.trim_end_matches(':');
        let valid = !kind.is_empty()
            && kind
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return None;
        }

        let lead = remainder.trim().trim_start_matches(':').trim();
        Some(Opening {
            label: kind.to_owned(),
            lead: (!lead.is_empty()).then(|| lead.to_owned()),
        })
    }

    fn render(&self, opening: &Opening, body_html: &str) -> String {
        let kind = &opening.label;
        let modifier = kind.to_ascii_lowercase();
        format!(
            "<div class=\"p-notification--{modifier}\">\n\
             <div class=\"p-notification__response\">\n\
             <span class=\"p-notification__status\">{kind}:</span>\n\
             {body_html}</div>\n\
             </div>\n"
        )
    }
}

//! YAML front matter splitting and parsing.
//!
//! A document starts with front matter when its first line is `---`. The
//! block ends at the next line that is `---` or `...`:
//!
//! ```text
//! ---
//! title: Getting started
//! tags: [intro, setup]
//! ---
//! # Body starts here
//! ```

use serde_json::Value;

/// Page metadata: string keys mapped to arbitrary YAML-compatible values.
pub type Metadata = serde_json::Map<String, Value>;

/// A document split into its front matter and body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontMatter<'a> {
    /// Raw YAML between the delimiters, `None` when the document has no block.
    pub yaml: Option<&'a str>,
    /// Markdown text after the closing delimiter (the whole text without a block).
    pub body: &'a str,
}

impl FrontMatter<'_> {
    /// Parse the YAML block into a metadata mapping.
    ///
    /// Documents without a block, or with an empty one, yield an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or its top level is not a mapping.
    pub fn metadata(&self) -> Result<Metadata, MetadataError> {
        match self.yaml {
            Some(yaml) => parse_metadata(yaml),
            None => Ok(Metadata::new()),
        }
    }
}

/// Error returned when front matter cannot be turned into metadata.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("{0}")]
    Parse(String),
    /// Valid YAML whose top level is a scalar or sequence.
    #[error("front matter must be a mapping, found {0}")]
    NotMapping(&'static str),
}

/// Split a document into front matter and body.
///
/// A leading byte-order mark is ignored. An opening `---` line without a
/// matching closing line is treated as ordinary Markdown.
#[must_use]
pub fn split_front_matter(text: &str) -> FrontMatter<'_> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let no_block = FrontMatter {
        yaml: None,
        body: text,
    };

    let Some(rest) = after_opening_delimiter(text) else {
        return no_block;
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return FrontMatter {
                yaml: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }

    no_block
}

/// Return the text after a first line of `---`, if there is one.
fn after_opening_delimiter(text: &str) -> Option<&str> {
    let newline = text.find('\n')?;
    (text[..newline].trim_end() == "---").then(|| &text[newline + 1..])
}

/// Parse YAML front matter content into metadata.
///
/// A key repeated within one block keeps its last value.
fn parse_metadata(yaml: &str) -> Result<Metadata, MetadataError> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| MetadataError::Parse(format!("Invalid YAML: {e}")))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Metadata::new()),
        Value::Array(_) => Err(MetadataError::NotMapping("a sequence")),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Err(MetadataError::NotMapping("a scalar"))
        }
    }
}

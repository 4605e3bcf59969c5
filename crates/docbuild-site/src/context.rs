//! Template contexts.
//!
//! A build loads one [`GlobalContext`] from the YAML context file and shares it
//! read-only. Each page gets its own [`PageContext`]: a value copy of the
//! global mapping, overlaid with the page's front matter, plus `content`.

use std::fs;
use std::path::{Path, PathBuf};

use docbuild_renderer::Metadata;
use serde::Serialize;
use serde_json::Value;

/// Key under which the rendered page body is exposed to templates.
pub const CONTENT_KEY: &str = "content";

/// Variables shared by every page of a build.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlobalContext {
    values: Metadata,
}

/// Error returned when the context file cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Context file missing or unreadable.
    #[error("Failed to read context file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Context file is not a YAML mapping.
    #[error("Invalid context file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl GlobalContext {
    /// Create a context from existing values.
    #[must_use]
    pub fn new(values: Metadata) -> Self {
        Self { values }
    }

    /// Load a YAML context file.
    ///
    /// An empty file yields an empty context.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Read`] if the file cannot be read and
    /// [`ContextError::Parse`] if it is not a YAML mapping.
    pub fn load(path: &Path) -> Result<Self, ContextError> {
        let content = fs::read_to_string(path).map_err(|source| ContextError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|message| ContextError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse YAML content into a context.
    fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value =
            serde_yaml::from_str(content).map_err(|e| format!("Invalid YAML: {e}"))?;
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            _ => Err("top level must be a mapping".to_owned()),
        }
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of top-level variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the context has no variables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Variables for rendering one page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PageContext {
    values: Metadata,
}

impl PageContext {
    /// Look up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// All variables.
    #[must_use]
    pub fn values(&self) -> &Metadata {
        &self.values
    }
}

/// Build the context for one page.
///
/// Precedence, lowest to highest: global variables, page metadata, the
/// rendered `content`. The global context is copied, so nested values changed
/// on one page never reach another.
#[must_use]
pub fn build_context(global: &GlobalContext, metadata: Metadata, html: String) -> PageContext {
    let mut values = global.values.clone();
    values.extend(metadata);
    values.insert(CONTENT_KEY.to_owned(), Value::String(html));
    PageContext { values }
}

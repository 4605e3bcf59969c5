//! Page rendering: template, then link repair.

use std::path::PathBuf;

use crate::context::PageContext;
use crate::links::{LinkStyle, rewrite_md_links, rewrite_media_links};
use crate::paths::{parent_dir, relative_path};
use crate::template::{PageTemplate, TemplateError};

/// Where output pages find media files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaLocation {
    /// Absolute base URL, used verbatim on every page.
    Url(String),
    /// Output media directory (normalized), referenced relative to each page.
    Directory(PathBuf),
}

impl MediaLocation {
    /// Absolute base URL, without a trailing `/`.
    #[must_use]
    pub fn url(base: &str) -> Self {
        Self::Url(base.trim_end_matches('/').to_owned())
    }
}

/// Source and output locations of one page, both normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagePaths {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Renders page contexts into final HTML.
///
/// Shared read-only across build workers.
#[derive(Debug)]
pub struct PageRenderer {
    template: PageTemplate,
    source_media: PathBuf,
    media: MediaLocation,
    link_style: LinkStyle,
}

impl PageRenderer {
    /// Create a renderer.
    ///
    /// `source_media` must be normalized.
    #[must_use]
    pub fn new(
        template: PageTemplate,
        source_media: PathBuf,
        media: MediaLocation,
        link_style: LinkStyle,
    ) -> Self {
        Self {
            template,
            source_media,
            media,
            link_style,
        }
    }

    /// Render a page and repair its media and internal links.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] if the template fails for this
    /// context.
    pub fn render(&self, context: &PageContext, paths: &PagePaths) -> Result<String, TemplateError> {
        let html = self.template.render(context)?;
        Ok(self.repair_links(&html, paths))
    }

    /// Apply the media and `.md` link passes to rendered HTML.
    #[must_use]
    pub fn repair_links(&self, html: &str, paths: &PagePaths) -> String {
        let old = relative_path(parent_dir(&paths.source), &self.source_media);
        let new = match &self.media {
            MediaLocation::Url(url) => url.clone(),
            MediaLocation::Directory(dir) => relative_path(parent_dir(&paths.output), dir),
        };
        let html = rewrite_media_links(html, &old, &new);
        rewrite_md_links(&html, self.link_style).into_owned()
    }
}

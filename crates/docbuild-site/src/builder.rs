//! Tree builder: turns a Markdown source tree into an HTML output tree.

use std::fs;
use std::path::{Path, PathBuf};

use docbuild_renderer::{MarkdownParser, ParseError};
use rayon::prelude::*;

use crate::context::{GlobalContext, build_context};
use crate::links::LinkStyle;
use crate::media::mirror_tree;
use crate::page::{MediaLocation, PagePaths, PageRenderer};
use crate::paths::{normalize, output_path};
use crate::scanner::Scanner;
use crate::template::{PageTemplate, TemplateError};

/// What to do when a page fails to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failing page.
    #[default]
    FailFast,
    /// Build every page possible, then report all failures.
    KeepGoing,
}

/// Locations and policies for one build.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Root of the Markdown source tree.
    pub source_dir: PathBuf,
    /// Media directory referenced by source pages.
    pub media_dir: PathBuf,
    /// Root of the HTML output tree.
    pub output_dir: PathBuf,
    /// Directory the media tree is mirrored into.
    pub output_media_dir: PathBuf,
    /// Absolute media base URL, replacing relative media paths.
    pub media_url: Option<String>,
    pub link_style: LinkStyle,
    pub failure_policy: FailurePolicy,
}

impl BuildOptions {
    /// Options with `media` subdirectories under both roots.
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let output_dir = output_dir.into();
        Self {
            media_dir: source_dir.join("media"),
            output_media_dir: output_dir.join("media"),
            source_dir,
            output_dir,
            media_url: None,
            link_style: LinkStyle::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_media_dir(mut self, media_dir: impl Into<PathBuf>) -> Self {
        self.media_dir = media_dir.into();
        self
    }

    #[must_use]
    pub fn with_output_media_dir(mut self, output_media_dir: impl Into<PathBuf>) -> Self {
        self.output_media_dir = output_media_dir.into();
        self
    }

    #[must_use]
    pub fn with_media_url(mut self, media_url: Option<String>) -> Self {
        self.media_url = media_url;
        self
    }

    #[must_use]
    pub fn with_link_style(mut self, link_style: LinkStyle) -> Self {
        self.link_style = link_style;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }
}

/// Summary of a successful build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages written.
    pub pages: usize,
    /// Media files mirrored into the output media directory.
    pub media_copied: usize,
}

/// Error building a single page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Output file or its directory could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error returned by [`SiteBuilder`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A configured path cannot be made absolute.
    #[error("Invalid path {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Source root missing or unreadable.
    #[error("Failed to read source directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Media mirroring failed.
    #[error("Failed to copy media from {} to {}: {source}", from.display(), to.display())]
    Media {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A page failed under [`FailurePolicy::FailFast`].
    #[error("{}: {source}", path.display())]
    Page {
        path: PathBuf,
        #[source]
        source: PageError,
    },
    /// Pages failed under [`FailurePolicy::KeepGoing`].
    #[error("{} of {total} pages failed to build", failures.len())]
    Pages {
        total: usize,
        failures: Vec<(PathBuf, PageError)>,
    },
}

/// Builds an output tree from a source tree.
///
/// The global context, template and parser are shared read-only by all pages;
/// pages are rendered in parallel once the media tree has been mirrored.
pub struct SiteBuilder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    source_media: PathBuf,
    output_media: PathBuf,
    failure_policy: FailurePolicy,
    parser: MarkdownParser,
    renderer: PageRenderer,
    global: GlobalContext,
}

impl SiteBuilder {
    /// Create a builder, resolving every configured directory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Path`] if a directory cannot be made absolute.
    pub fn new(
        options: BuildOptions,
        template: PageTemplate,
        global: GlobalContext,
    ) -> Result<Self, BuildError> {
        let source_dir = resolve(&options.source_dir)?;
        let output_dir = resolve(&options.output_dir)?;
        let source_media = resolve(&options.media_dir)?;
        let output_media = resolve(&options.output_media_dir)?;

        let media = match options.media_url.as_deref() {
            Some(url) => MediaLocation::url(url),
            None => MediaLocation::Directory(output_media.clone()),
        };
        let renderer = PageRenderer::new(template, source_media.clone(), media, options.link_style);

        Ok(Self {
            source_dir,
            output_dir,
            source_media,
            output_media,
            failure_policy: options.failure_policy,
            parser: MarkdownParser::new(),
            renderer,
            global,
        })
    }

    /// Replace the Markdown parser.
    #[must_use]
    pub fn with_parser(mut self, parser: MarkdownParser) -> Self {
        self.parser = parser;
        self
    }

    /// Mirror media, then build every page.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Media`] or [`BuildError::Scan`] before any page is
    /// built, then page failures according to the [`FailurePolicy`].
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let media_copied = self.copy_media()?;

        let exclude = (self.output_dir != self.source_dir
            && self.output_dir.starts_with(&self.source_dir))
            .then(|| self.output_dir.clone());
        let pages = Scanner::new(self.source_dir.clone(), exclude)
            .scan()
            .map_err(|source| BuildError::Scan {
                path: self.source_dir.clone(),
                source,
            })?;
        tracing::debug!(count = pages.len(), source = %self.source_dir.display(), "Discovered pages");

        match self.failure_policy {
            FailurePolicy::FailFast => {
                pages.par_iter().try_for_each(|relative| {
                    self.build_page(relative)
                        .map_err(|source| BuildError::Page {
                            path: relative.clone(),
                            source,
                        })
                })?;
            }
            FailurePolicy::KeepGoing => {
                let failures: Vec<_> = pages
                    .par_iter()
                    .filter_map(|relative| {
                        self.build_page(relative).err().map(|e| {
                            tracing::warn!(path = %relative.display(), error = %e, "Page failed");
                            (relative.clone(), e)
                        })
                    })
                    .collect();
                if !failures.is_empty() {
                    return Err(BuildError::Pages {
                        total: pages.len(),
                        failures,
                    });
                }
            }
        }

        Ok(BuildReport {
            pages: pages.len(),
            media_copied,
        })
    }

    fn copy_media(&self) -> Result<usize, BuildError> {
        if self.source_media == self.output_media {
            return Ok(0);
        }
        if !self.source_media.is_dir() {
            tracing::warn!(path = %self.source_media.display(), "Media directory not found, skipping copy");
            return Ok(0);
        }

        // The output tree may sit inside the media tree, e.g. `--media-dir .`.
        let skip = [self.output_dir.as_path()];
        let copied =
            mirror_tree(&self.source_media, &self.output_media, &skip).map_err(|source| {
                BuildError::Media {
                    from: self.source_media.clone(),
                    to: self.output_media.clone(),
                    source,
                }
            })?;
        tracing::info!(
            files = copied,
            from = %self.source_media.display(),
            to = %self.output_media.display(),
            "Copied media"
        );
        Ok(copied)
    }

    /// Parse, render and write one page given its source-relative path.
    fn build_page(&self, relative: &Path) -> Result<(), PageError> {
        let source = self.source_dir.join(relative);
        let output = output_path(&self.output_dir, relative);

        let page = self.parser.parse_file(&source)?;
        let context = build_context(&self.global, page.metadata, page.html);
        let paths = PagePaths { source, output };
        let html = self.renderer.render(&context, &paths)?;

        if let Some(parent) = paths.output.parent() {
            fs::create_dir_all(parent).map_err(|source| PageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&paths.output, html).map_err(|source| PageError::Write {
            path: paths.output.clone(),
            source,
        })?;

        tracing::info!(path = %paths.output.display(), "Created page");
        Ok(())
    }
}

fn resolve(path: &Path) -> Result<PathBuf, BuildError> {
    normalize(path).map_err(|source| BuildError::Path {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::UndefinedPolicy;
    use serde_json::json;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(root: &Path, relative: &str) -> String {
        fs::read_to_string(root.join(relative)).unwrap()
    }

    fn template(source: &str, policy: UndefinedPolicy) -> PageTemplate {
        PageTemplate::from_source(source.to_owned(), policy).unwrap()
    }

    fn build(options: BuildOptions) -> Result<BuildReport, BuildError> {
        let template = template("<title>{{ title }}</title>{{ content }}", UndefinedPolicy::Lenient);
        SiteBuilder::new(options, template, GlobalContext::default())?.build()
    }

    /// `docs/` with a home page, a guide linking to it and a logo.
    fn docs_tree(root: &Path) -> PathBuf {
        let docs = root.join("docs");
        write(&docs, "index.md", "---\ntitle: Home\n---\n# Welcome\n");
        write(
            &docs,
            "guide.md",
            "# Guide\n\n[Home](index.md) and [logo](media/logo.png)\n",
        );
        write(&docs, "media/logo.png", "png");
        docs
    }

    #[test]
    fn test_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let docs = docs_tree(dir.path());
        let out = dir.path().join("build");

        let report = build(BuildOptions::new(&docs, &out)).unwrap();

        assert_eq!(report, BuildReport { pages: 2, media_copied: 1 });
        assert!(out.join("index.html").is_file());
        assert!(out.join("media/logo.png").is_file());
        let guide = read(&out, "guide.html");
        assert!(guide.contains(r#"href="index.html""#));
        assert!(guide.contains(r#"href="media/logo.png""#));
        assert!(read(&out, "index.html").contains("<title>Home</title>"));
    }

    #[test]
    fn test_clean_links() {
        let dir = tempfile::tempdir().unwrap();
        let docs = docs_tree(dir.path());
        let out = dir.path().join("build");

        build(BuildOptions::new(&docs, &out).with_link_style(LinkStyle::Clean)).unwrap();

        let guide = read(&out, "guide.html");
        assert!(guide.contains(r#"href="index""#));
        assert!(!guide.contains("index.md"));
    }

    #[test]
    fn test_nested_output_directories_created() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "a/b/page.md", "[img](../../media/x.png)\n");
        write(&docs, "media/x.png", "x");
        let out = dir.path().join("deep/nested/site");

        build(
            BuildOptions::new(&docs, &out).with_output_media_dir(dir.path().join("static")),
        )
        .unwrap();

        let page = read(&out, "a/b/page.html");
        assert!(page.contains(r#"href="../../../../../static/x.png""#));
        assert!(dir.path().join("static/x.png").is_file());
    }

    #[test]
    fn test_media_url() {
        let dir = tempfile::tempdir().unwrap();
        let docs = docs_tree(dir.path());
        let out = dir.path().join("build");

        build(
            BuildOptions::new(&docs, &out)
                .with_media_url(Some("https://assets.example.com/media/".to_owned())),
        )
        .unwrap();

        let guide = read(&out, "guide.html");
        assert!(guide.contains(r#"href="https://assets.example.com/media/logo.png""#));
    }

    #[test]
    fn test_missing_media_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "index.md", "Hi\n");

        let report = build(BuildOptions::new(&docs, dir.path().join("out"))).unwrap();
        assert_eq!(report, BuildReport { pages: 1, media_copied: 0 });
    }

    #[test]
    fn test_output_inside_source_is_not_scanned() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "index.md", "Hi\n");
        write(&docs, "build/old.md", "stale\n");

        let report = build(BuildOptions::new(&docs, docs.join("build"))).unwrap();
        assert_eq!(report.pages, 1);
        assert!(!docs.join("build/build").exists());
    }

    #[test]
    fn test_media_dir_is_source_root() {
        let dir = tempfile::tempdir().unwrap();
        let docs = docs_tree(dir.path());
        let out = docs.join("build");

        let report = build(BuildOptions::new(&docs, &out).with_media_dir(&docs)).unwrap();

        assert_eq!(report.pages, 2);
        assert!(out.join("media/media/logo.png").is_file());
        assert!(!out.join("media/build").exists());
        assert!(out.join("guide.html").is_file());

        // A second build must not pick up the first build's output.
        let again = build(BuildOptions::new(&docs, &out).with_media_dir(&docs)).unwrap();
        assert_eq!(again.media_copied, report.media_copied);
    }

    #[test]
    fn test_custom_parser() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "page.md", "^# Title\n    Body\n");
        let out = dir.path().join("out");

        let template = template("{{ content }}", UndefinedPolicy::Lenient);
        SiteBuilder::new(BuildOptions::new(&docs, &out), template, GlobalContext::default())
            .unwrap()
            .with_parser(MarkdownParser::empty())
            .build()
            .unwrap();

        let page = read(&out, "page.html");
        assert!(page.starts_with("<p>^# Title"));
        assert!(!page.contains("<details"));
    }

    #[test]
    fn test_rebuild_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let docs = docs_tree(dir.path());
        let out = dir.path().join("build");

        build(BuildOptions::new(&docs, &out)).unwrap();
        let first = read(&out, "guide.html");
        build(BuildOptions::new(&docs, &out)).unwrap();
        assert_eq!(read(&out, "guide.html"), first);
    }

    #[test]
    fn test_global_context_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "a.md", "---\ntitle: Page A\n---\nA\n");
        write(&docs, "b.md", "B\n");
        let out = dir.path().join("out");

        let serde_json::Value::Object(values) = json!({"title": "Site"}) else {
            unreachable!();
        };
        let template = template("[{{ title }}]", UndefinedPolicy::Lenient);
        SiteBuilder::new(BuildOptions::new(&docs, &out), template, GlobalContext::new(values))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(read(&out, "a.html"), "[Page A]");
        assert_eq!(read(&out, "b.html"), "[Site]");
    }

    #[test]
    fn test_fail_fast_names_page() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "bad.md", "---\n- a\n---\n");

        let err = build(BuildOptions::new(&docs, dir.path().join("out"))).unwrap_err();
        assert!(matches!(err, BuildError::Page { .. }));
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_keep_going_reports_all_failures() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        let out = dir.path().join("out");
        write(&docs, "good.md", "Fine\n");
        write(&docs, "bad1.md", "---\n[x\n---\n");
        write(&docs, "bad2.md", "---\n- a\n---\n");

        let err = build(
            BuildOptions::new(&docs, &out).with_failure_policy(FailurePolicy::KeepGoing),
        )
        .unwrap_err();

        let BuildError::Pages { total, failures } = err else {
            panic!("expected Pages error");
        };
        assert_eq!(total, 3);
        assert_eq!(failures.len(), 2);
        assert!(out.join("good.html").is_file());
    }

    #[test]
    fn test_strict_template_fails_page() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("docs");
        write(&docs, "page.md", "Body\n");

        let template = template("{{ undefined_var }}", UndefinedPolicy::Strict);
        let err = SiteBuilder::new(
            BuildOptions::new(&docs, dir.path().join("out")),
            template,
            GlobalContext::default(),
        )
        .unwrap()
        .build()
        .unwrap_err();

        assert!(matches!(
            err,
            BuildError::Page {
                source: PageError::Template(TemplateError::Render(_)),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_source_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = build(BuildOptions::new(dir.path().join("missing"), dir.path().join("out")))
            .unwrap_err();
        assert!(matches!(err, BuildError::Scan { .. }));
    }
}

//! Static documentation site building for docbuild.
//!
//! This crate turns a tree of Markdown files into a tree of HTML pages:
//!
//! 1. [`SiteBuilder`] mirrors the media directory and discovers `*.md` files
//! 2. each file is parsed by [`docbuild_renderer::MarkdownParser`]
//! 3. [`build_context`] layers page metadata over the [`GlobalContext`]
//! 4. [`PageRenderer`] renders the [`PageTemplate`] and repairs media and
//!    internal links
//! 5. the page is written next to its siblings under the output root
//!
//! # Example
//!
//! ```no_run
//! use docbuild_site::{BuildOptions, GlobalContext, PageTemplate, SiteBuilder, UndefinedPolicy};
//!
//! let template = PageTemplate::builtin(UndefinedPolicy::Lenient)?;
//! let context = GlobalContext::load("docs/context.yaml".as_ref())?;
//! let options = BuildOptions::new("docs", "build");
//!
//! let report = SiteBuilder::new(options, template, context)?.build()?;
//! println!("{} pages", report.pages);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod context;
mod links;
mod media;
mod page;
mod paths;
mod scanner;
mod template;

pub use builder::{BuildError, BuildOptions, BuildReport, FailurePolicy, PageError, SiteBuilder};
pub use context::{ContextError, GlobalContext, PageContext, build_context};
pub use links::{LinkStyle, rewrite_md_links, rewrite_media_links};
pub use media::mirror_tree;
pub use page::{MediaLocation, PagePaths, PageRenderer};
pub use paths::{normalize, output_path, relative_path};
pub use template::{PageTemplate, TemplateError, UndefinedPolicy};

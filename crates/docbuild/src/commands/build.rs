//! `docbuild build` command implementation.

use std::path::PathBuf;

use clap::Args;
use docbuild_config::{CliSettings, Config};
use docbuild_site::{
    BuildError, BuildOptions, FailurePolicy, GlobalContext, LinkStyle, PageTemplate, SiteBuilder,
    UndefinedPolicy,
};
use docbuild_vcs::RemoteCheckout;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Git repository to clone and build from.
    #[arg(long, env = "DOCBUILD_REPOSITORY")]
    repository: Option<String>,

    /// Branch to check out (default: the remote's default branch).
    #[arg(long)]
    branch: Option<String>,

    /// Markdown source directory, relative to the source root (default: .).
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Media directory, relative to the source root (default: media).
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// YAML context file, relative to the source root (default: context.yaml).
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Output directory for the generated site (default: build).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output media directory (default: <output-dir>/media).
    #[arg(long)]
    output_media_dir: Option<PathBuf>,

    /// Page template (default: built-in wrapper).
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Absolute base URL for media links.
    #[arg(long)]
    media_url: Option<String>,

    /// Link to `page` instead of `page.html`.
    #[arg(long)]
    no_link_extensions: bool,

    /// Fail on undefined template variables.
    #[arg(long)]
    strict_templates: bool,

    /// Build every page and report all failures.
    #[arg(long)]
    keep_going: bool,

    /// Path to configuration file (default: auto-discover docbuild.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            repository: self.repository.clone(),
            branch: self.branch.clone(),
            source_dir: self.source_dir.clone(),
            media_dir: self.media_dir.clone(),
            context_file: self.context_file.clone(),
            output_dir: self.output_dir.clone(),
            output_media_dir: self.output_media_dir.clone(),
            template: self.template.clone(),
            media_url: self.media_url.clone(),
            strip_md_extension: self.no_link_extensions.then_some(true),
            strict_templates: self.strict_templates.then_some(true),
            keep_going: self.keep_going.then_some(true),
        }
    }

    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        // Kept alive until the build finishes; the clone is deleted on drop.
        let checkout = match &config.source_resolved.repository {
            Some(url) => {
                let branch = config.source_resolved.branch.as_deref();
                output.cloning(url, branch);
                Some(RemoteCheckout::clone(url, branch)?)
            }
            None => None,
        };
        let root = checkout
            .as_ref()
            .map_or_else(|| config.local_source_root(), RemoteCheckout::path);
        let source = config.source_resolved.paths(root);
        tracing::info!(
            source = %source.dir.display(),
            media = %source.media_dir.display(),
            context = %source.context_file.display(),
            "Resolved source paths"
        );

        let policy = if config.template_resolved.strict {
            UndefinedPolicy::Strict
        } else {
            UndefinedPolicy::Lenient
        };
        let template = PageTemplate::load(config.template_resolved.path.as_deref(), policy)?;
        let context = GlobalContext::load(&source.context_file)?;
        tracing::info!(variables = context.len(), "Loaded global context");

        let options = BuildOptions::new(&source.dir, &config.output_resolved.dir)
            .with_media_dir(&source.media_dir)
            .with_output_media_dir(config.output_resolved.media_dir())
            .with_media_url(config.output_resolved.media_url.clone())
            .with_link_style(if config.links.strip_md_extension {
                LinkStyle::Clean
            } else {
                LinkStyle::Html
            })
            .with_failure_policy(if config.build.keep_going {
                FailurePolicy::KeepGoing
            } else {
                FailurePolicy::FailFast
            });

        output.location("Source", &source.dir);
        output.location("Output", &config.output_resolved.dir);

        let report = match SiteBuilder::new(options, template, context)?.build() {
            Ok(report) => report,
            Err(BuildError::Pages { total, failures }) => {
                for (path, error) in &failures {
                    output.page_failed(path, error);
                }
                return Err(BuildError::Pages { total, failures }.into());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(pages = report.pages, media = report.media_copied, "Build finished");
        output.built(&report, &config.output_resolved.dir);
        Ok(())
    }
}

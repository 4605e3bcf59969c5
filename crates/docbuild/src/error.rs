//! CLI error types.

use docbuild_config::ConfigError;
use docbuild_site::{BuildError, ContextError, TemplateError};
use docbuild_vcs::VcsError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Vcs(#[from] VcsError),

    #[error("{0}")]
    Template(#[from] TemplateError),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("{0}")]
    Build(#[from] BuildError),
}

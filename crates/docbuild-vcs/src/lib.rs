//! Remote git checkouts for docbuild.
//!
//! A [`RemoteCheckout`] clones a repository into a fresh temporary directory
//! and removes it again when dropped, so a build can read its sources from
//! [`RemoteCheckout::path`] for as long as the checkout is alive.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use tempfile::TempDir;

/// Error returned when a repository cannot be checked out.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    /// Temporary directory could not be created.
    #[error("Failed to create checkout directory: {0}")]
    TempDir(#[source] std::io::Error),
    /// Branch name is not a valid reference name.
    #[error("Invalid branch {branch:?}: {message}")]
    Branch { branch: String, message: String },
    /// URL invalid or fetch failed.
    #[error("Failed to clone {url}: {message}")]
    Clone { url: String, message: String },
    /// Fetched repository could not be checked out into a worktree.
    #[error("Failed to check out {url}: {message}")]
    Checkout { url: String, message: String },
}

/// Working tree of a cloned repository, deleted on drop.
#[derive(Debug)]
pub struct RemoteCheckout {
    dir: TempDir,
}

impl RemoteCheckout {
    /// Clone `url` into a new temporary directory.
    ///
    /// Checks out `branch` when given, otherwise the remote's default branch.
    ///
    /// # Errors
    ///
    /// Returns a [`VcsError`] if the directory cannot be created, the branch
    /// name is invalid, or the fetch or checkout fails.
    pub fn clone(url: &str, branch: Option<&str>) -> Result<Self, VcsError> {
        let dir = tempfile::Builder::new()
            .prefix("docbuild-")
            .tempdir()
            .map_err(VcsError::TempDir)?;
        tracing::info!(url, branch, path = %dir.path().display(), "Cloning repository");

        let clone_error = |message: String| VcsError::Clone {
            url: url.to_owned(),
            message,
        };
        let interrupt = AtomicBool::new(false);

        let mut prepare =
            gix::prepare_clone(url, dir.path()).map_err(|e| clone_error(e.to_string()))?;
        if let Some(branch) = branch {
            prepare = prepare
                .with_ref_name(Some(branch))
                .map_err(|e| VcsError::Branch {
                    branch: branch.to_owned(),
                    message: e.to_string(),
                })?;
        }

        let (mut checkout, _) = prepare
            .fetch_then_checkout(gix::progress::Discard, &interrupt)
            .map_err(|e| clone_error(e.to_string()))?;
        checkout
            .main_worktree(gix::progress::Discard, &interrupt)
            .map_err(|e| VcsError::Checkout {
                url: url.to_owned(),
                message: e.to_string(),
            })?;

        tracing::debug!(url, "Clone complete");
        Ok(Self { dir })
    }

    /// Root of the working tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_missing_local_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-repo");

        let result = RemoteCheckout::clone(&missing.to_string_lossy(), None);
        assert!(result.is_err());
    }

    #[test]
    fn test_clone_invalid_branch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-repo");

        let result = RemoteCheckout::clone(&missing.to_string_lossy(), Some("bad..branch"));
        assert!(result.is_err());
    }

    #[test]
    fn test_error_messages_name_url() {
        let err = VcsError::Clone {
            url: "https://example.com/docs.git".to_owned(),
            message: "connection refused".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to clone https://example.com/docs.git: connection refused"
        );
    }
}

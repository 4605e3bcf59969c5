//! Build progress and result messages on stderr.

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};
use docbuild_site::BuildReport;

/// Terminal output formatter writing to stderr.
pub(crate) struct Output {
    term: Term,
    dim: Style,
    green: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            dim: Style::new().dim(),
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Print a labelled path, e.g. `Source: docs`.
    pub(crate) fn location(&self, label: &str, path: &Path) {
        let line = format!("{} {}", self.dim.apply_to(format!("{label}:")), path.display());
        let _ = self.term.write_line(&line);
    }

    /// Print the repository being cloned.
    pub(crate) fn cloning(&self, url: &str, branch: Option<&str>) {
        let line = match branch {
            Some(branch) => format!("Cloning {url} ({branch})"),
            None => format!("Cloning {url}"),
        };
        let _ = self.term.write_line(&line);
    }

    /// Print one failed page under `--keep-going`.
    pub(crate) fn page_failed(&self, path: &Path, error: &dyn Display) {
        let line = format!("  {} {}: {error}", self.red.apply_to("failed"), path.display());
        let _ = self.term.write_line(&line);
    }

    /// Print the build summary (green).
    pub(crate) fn built(&self, report: &BuildReport, output_dir: &Path) {
        let line = build_summary(report, output_dir);
        let _ = self.term.write_line(&self.green.apply_to(line).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}

fn build_summary(report: &BuildReport, output_dir: &Path) -> String {
    let pages = plural(report.pages, "page", "pages");
    match report.media_copied {
        0 => format!("Built {pages} to {}", output_dir.display()),
        n => format!(
            "Built {pages} and copied {} to {}",
            plural(n, "media file", "media files"),
            output_dir.display()
        ),
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("1 {one}")
    } else {
        format!("{n} {many}")
    }
}

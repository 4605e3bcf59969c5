//! Configuration management for docbuild.
//!
//! Parses `docbuild.toml` with serde and discovers it in the current directory
//! or its parents. CLI settings are applied on top via [`CliSettings`].
//!
//! ## Paths
//!
//! `[source]` paths are relative to the source root: the cloned repository
//! when `source.repository` is set, otherwise the directory holding the config
//! file (or the current directory when there is none). `[output]` and
//! `[template]` paths are relative to the config file's directory.
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in:
//! - `source.repository`
//! - `source.branch`
//! - `output.media_url`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docbuild.toml";

/// CLI settings that override configuration file values.
///
/// Only `Some` values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub repository: Option<String>,
    pub branch: Option<String>,
    /// Source paths are relative to the source root.
    pub source_dir: Option<PathBuf>,
    pub media_dir: Option<PathBuf>,
    pub context_file: Option<PathBuf>,
    /// Output and template paths are used as given.
    pub output_dir: Option<PathBuf>,
    pub output_media_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub media_url: Option<String>,
    pub strip_md_extension: Option<bool>,
    pub strict_templates: Option<bool>,
    pub keep_going: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    source: SourceConfigRaw,
    output: OutputConfigRaw,
    template: TemplateConfigRaw,
    /// Internal link rewriting.
    pub links: LinksConfig,
    /// Build behaviour.
    pub build: BuildConfig,

    /// Resolved source configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub template_resolved: TemplateConfig,
    /// Directory local source paths are relative to.
    #[serde(skip)]
    pub base_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw `[source]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    repository: Option<String>,
    branch: Option<String>,
    dir: Option<String>,
    media_dir: Option<String>,
    context_file: Option<String>,
}

/// Where Markdown, media and context come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Git repository to clone instead of reading a local tree.
    pub repository: Option<String>,
    /// Branch to check out; the remote HEAD when unset.
    pub branch: Option<String>,
    /// Markdown root, relative to the source root.
    pub dir: PathBuf,
    /// Media directory, relative to the source root.
    pub media_dir: PathBuf,
    /// YAML context file, relative to the source root.
    pub context_file: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            repository: None,
            branch: None,
            dir: PathBuf::from("."),
            media_dir: PathBuf::from("media"),
            context_file: PathBuf::from("context.yaml"),
        }
    }
}

/// Source locations anchored at a source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub dir: PathBuf,
    pub media_dir: PathBuf,
    pub context_file: PathBuf,
}

impl SourceConfig {
    /// Anchor the relative source paths at `root`.
    #[must_use]
    pub fn paths(&self, root: &Path) -> SourcePaths {
        SourcePaths {
            dir: root.join(&self.dir),
            media_dir: root.join(&self.media_dir),
            context_file: root.join(&self.context_file),
        }
    }
}

/// Raw `[output]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    media_dir: Option<String>,
    media_url: Option<String>,
}

/// Where the site is written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Output root.
    pub dir: PathBuf,
    /// Explicit output media directory.
    pub media_dir: Option<PathBuf>,
    /// Absolute media base URL.
    pub media_url: Option<String>,
}

impl OutputConfig {
    /// Output media directory, defaulting to `media` under the output root.
    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| self.dir.join("media"))
    }
}

/// Raw `[template]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TemplateConfigRaw {
    path: Option<String>,
    strict: Option<bool>,
}

/// Page template settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Custom template; the built-in wrapper when unset.
    pub path: Option<PathBuf>,
    /// Fail on undefined template variables.
    pub strict: bool,
}

/// `[links]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinksConfig {
    /// Link to `page` instead of `page.html`.
    pub strip_md_extension: bool,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildConfig {
    /// Build every page and report all failures instead of stopping at the
    /// first one.
    pub keep_going: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`source.repository`").
        field: String,
        /// Error message (e.g., "${`DOCS_REPO`} not set").
        message: String,
    },
}

/// Require a media URL to be absolute or protocol-relative.
fn require_absolute_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("//") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http://, https:// or //"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `docbuild.toml` in the current directory and its parents, falling
    /// back to defaults. CLI settings are applied last and the result is
    /// validated.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the merged settings are invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let source = &mut self.source_resolved;
        if let Some(repository) = &settings.repository {
            source.repository = Some(repository.clone());
        }
        if let Some(branch) = &settings.branch {
            source.branch = Some(branch.clone());
        }
        if let Some(dir) = &settings.source_dir {
            source.dir.clone_from(dir);
        }
        if let Some(media_dir) = &settings.media_dir {
            source.media_dir.clone_from(media_dir);
        }
        if let Some(context_file) = &settings.context_file {
            source.context_file.clone_from(context_file);
        }

        let output = &mut self.output_resolved;
        if let Some(dir) = &settings.output_dir {
            output.dir.clone_from(dir);
        }
        if let Some(media_dir) = &settings.output_media_dir {
            output.media_dir = Some(media_dir.clone());
        }
        if let Some(media_url) = &settings.media_url {
            output.media_url = Some(media_url.clone());
        }

        if let Some(path) = &settings.template {
            self.template_resolved.path = Some(path.clone());
        }
        if let Some(strict) = settings.strict_templates {
            self.template_resolved.strict = strict;
        }
        if let Some(strip) = settings.strip_md_extension {
            self.links.strip_md_extension = strip;
        }
        if let Some(keep_going) = settings.keep_going {
            self.build.keep_going = keep_going;
        }
    }

    /// Root that local source paths are relative to.
    #[must_use]
    pub fn local_source_root(&self) -> &Path {
        &self.base_dir
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: SourceConfigRaw::default(),
            output: OutputConfigRaw::default(),
            template: TemplateConfigRaw::default(),
            links: LinksConfig::default(),
            build: BuildConfig::default(),
            source_resolved: SourceConfig::default(),
            output_resolved: OutputConfig {
                dir: base.join("build"),
                media_dir: None,
                media_url: None,
            },
            template_resolved: TemplateConfig::default(),
            base_dir: base.to_path_buf(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.output_resolved.media_url {
            require_absolute_url(url, "output.media_url")?;
        }
        if self.source_resolved.branch.is_some() && self.source_resolved.repository.is_none() {
            return Err(ConfigError::Validation(
                "source.branch requires source.repository".to_owned(),
            ));
        }
        if self
            .source_resolved
            .repository
            .as_deref()
            .is_some_and(str::is_empty)
        {
            return Err(ConfigError::Validation(
                "source.repository cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref repository) = self.source.repository {
            self.source.repository = Some(expand::expand_env(repository, "source.repository")?);
        }
        if let Some(ref branch) = self.source.branch {
            self.source.branch = Some(expand::expand_env(branch, "source.branch")?);
        }
        if let Some(ref media_url) = self.output.media_url {
            self.output.media_url = Some(expand::expand_env(media_url, "output.media_url")?);
        }
        Ok(())
    }

    /// Resolve raw sections against the config file's directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = SourceConfig::default();
        let relative = |path: Option<&str>, default: PathBuf| path.map_or(default, PathBuf::from);

        self.source_resolved = SourceConfig {
            repository: self.source.repository.clone(),
            branch: self.source.branch.clone(),
            dir: relative(self.source.dir.as_deref(), defaults.dir),
            media_dir: relative(self.source.media_dir.as_deref(), defaults.media_dir),
            context_file: relative(self.source.context_file.as_deref(), defaults.context_file),
        };

        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or("build")),
            media_dir: self.output.media_dir.as_deref().map(|d| config_dir.join(d)),
            media_url: self.output.media_url.clone(),
        };

        self.template_resolved = TemplateConfig {
            path: self.template.path.as_deref().map(|p| config_dir.join(p)),
            strict: self.template.strict.unwrap_or(false),
        };

        self.base_dir = config_dir.to_path_buf();
    }
}

//! Page wrapper template.

use std::fs;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, UndefinedBehavior};

use crate::context::PageContext;

const TEMPLATE_NAME: &str = "page";
const BUILTIN_TEMPLATE: &str = include_str!("../resources/wrapper.html.j2");

/// How the template treats variables missing from the page context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndefinedPolicy {
    /// Missing variables render as empty strings.
    #[default]
    Lenient,
    /// Missing variables fail the page.
    Strict,
}

/// Error returned when loading or rendering the template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file missing or unreadable.
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Template source does not compile.
    #[error("Invalid template: {0}")]
    Syntax(#[source] minijinja::Error),
    /// Rendering failed for a page context.
    #[error("Template rendering failed: {0}")]
    Render(#[source] minijinja::Error),
}

/// Compiled wrapper template, shared read-only by all pages of a build.
///
/// Output is not auto-escaped: `content` is trusted HTML and other variables
/// are inserted verbatim unless the template applies `| e`.
#[derive(Debug)]
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    /// Compile the bundled default wrapper.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the bundled template fails to
    /// compile.
    pub fn builtin(policy: UndefinedPolicy) -> Result<Self, TemplateError> {
        Self::from_source(BUILTIN_TEMPLATE.to_owned(), policy)
    }

    /// Compile a template from source text.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Syntax`] if the source does not compile.
    pub fn from_source(source: String, policy: UndefinedPolicy) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_undefined_behavior(match policy {
            UndefinedPolicy::Lenient => UndefinedBehavior::Lenient,
            UndefinedPolicy::Strict => UndefinedBehavior::Strict,
        });
        env.add_template_owned(TEMPLATE_NAME, source)
            .map_err(TemplateError::Syntax)?;
        Ok(Self { env })
    }

    /// Read and compile a template file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] if the file cannot be read and
    /// [`TemplateError::Syntax`] if it does not compile.
    pub fn from_file(path: &Path, policy: UndefinedPolicy) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source, policy)
    }

    /// Compile `path` if given, else the bundled wrapper.
    ///
    /// # Errors
    ///
    /// See [`Self::from_file`] and [`Self::builtin`].
    pub fn load(path: Option<&Path>, policy: UndefinedPolicy) -> Result<Self, TemplateError> {
        match path {
            Some(path) => Self::from_file(path, policy),
            None => Self::builtin(policy),
        }
    }

    /// Render the template with a page's variables.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Render`] on runtime template errors, including
    /// undefined variables under [`UndefinedPolicy::Strict`].
    pub fn render(&self, context: &PageContext) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(TemplateError::Render)?;
        template.render(context).map_err(TemplateError::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{GlobalContext, build_context};
    use docbuild_renderer::Metadata;
    use serde_json::{Value, json};

    fn page(values: Value, html: &str) -> PageContext {
        let Value::Object(map) = values else {
            panic!("expected object");
        };
        build_context(&GlobalContext::new(map), Metadata::new(), html.to_owned())
    }

    fn compile(source: &str) -> PageTemplate {
        PageTemplate::from_source(source.to_owned(), UndefinedPolicy::Lenient).unwrap()
    }

    #[test]
    fn test_content_is_not_escaped() {
        let template = compile("<main>{{ content }}</main>");
        let html = template
            .render(&page(json!({}), "<p>A &amp; B</p>"))
            .unwrap();
        assert_eq!(html, "<main><p>A &amp; B</p></main>");
    }

    #[test]
    fn test_escape_filter() {
        let template = compile("{{ title | e }}");
        let html = template.render(&page(json!({"title": "<b>"}), "")).unwrap();
        assert_eq!(html, "&lt;b&gt;");
    }

    #[test]
    fn test_lenient_undefined_renders_empty() {
        let template = compile("[{{ missing }}]");
        assert_eq!(template.render(&page(json!({}), "")).unwrap(), "[]");
    }

    #[test]
    fn test_strict_undefined_fails() {
        let template =
            PageTemplate::from_source("[{{ missing }}]".to_owned(), UndefinedPolicy::Strict)
                .unwrap();
        let err = template.render(&page(json!({}), "")).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)));
    }

    #[test]
    fn test_loops_and_nested_values() {
        let template = compile("{% for item in nav.items %}{{ item }};{% endfor %}");
        let html = template
            .render(&page(json!({"nav": {"items": ["a", "b"]}}), ""))
            .unwrap();
        assert_eq!(html, "a;b;");
    }

    #[test]
    fn test_syntax_error() {
        let err =
            PageTemplate::from_source("{% if %}".to_owned(), UndefinedPolicy::Lenient).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax(_)));
    }

    #[test]
    fn test_builtin_template() {
        let template = PageTemplate::builtin(UndefinedPolicy::Strict).unwrap();
        let html = template
            .render(&page(json!({"title": "Install"}), "<p>Steps</p>"))
            .unwrap();
        assert!(html.contains("<title>Install | Documentation</title>"));
        assert!(html.contains("<p>Steps</p>"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        let err = PageTemplate::load(Some(&path), UndefinedPolicy::Lenient).unwrap_err();
        assert!(matches!(err, TemplateError::Read { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapper.html");
        fs::write(&path, "<body>{{ content }}</body>").unwrap();

        let template = PageTemplate::load(Some(&path), UndefinedPolicy::Lenient).unwrap();
        assert_eq!(
            template.render(&page(json!({}), "x")).unwrap(),
            "<body>x</body>"
        );
    }
}

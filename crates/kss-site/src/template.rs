//! Page templates.
//!
//! [`PageTemplates`] is the seam to the templating engine: one compiled
//! template per [`PageKind`], rendered against a [`PageContext`].
//! [`JinjaTemplates`] implements it with `minijinja`.

use std::path::{Path, PathBuf};

use kss_config::TemplatePaths;
use kss_sections::reference;
use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};
use pulldown_cmark::{Options, Parser};

use crate::page::PageContext;
use crate::project::section_url;

/// The three tiers of generated pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// The index page listing every root.
    Master,
    /// A page for one root and its direct documentation.
    Section,
    /// A page for a section nested under a root.
    Subsection,
}

impl PageKind {
    /// Registered template name.
    #[must_use]
    pub fn template_name(self) -> &'static str {
        match self {
            Self::Master => "main",
            Self::Section => "section",
            Self::Subsection => "subsection",
        }
    }
}

/// Error returned by template loading or rendering.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        /// Template path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Error reported by the template engine, unchanged.
    #[error(transparent)]
    Engine(#[from] minijinja::Error),
}

/// Renders pages of each kind.
pub trait PageTemplates {
    /// Render the template for `kind` against `context`.
    ///
    /// # Errors
    ///
    /// Returns the engine's error for malformed templates or missing fields.
    fn render(&self, kind: PageKind, context: &PageContext<'_>) -> Result<String, TemplateError>;
}

/// Template source text for each page kind.
#[derive(Clone, Debug)]
pub struct TemplateSources {
    /// Master page template.
    pub main: String,
    /// Section page template.
    pub section: String,
    /// Subsection page template.
    pub subsection: String,
}

impl TemplateSources {
    /// Read all three templates from disk.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Read`] for the first template that cannot be read.
    pub fn load(paths: &TemplatePaths) -> Result<Self, TemplateError> {
        Ok(Self {
            main: read_template(&paths.main)?,
            section: read_template(&paths.section)?,
            subsection: read_template(&paths.subsection)?,
        })
    }
}

fn read_template(path: &Path) -> Result<String, TemplateError> {
    std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// `minijinja`-backed page templates.
///
/// Output is HTML-escaped by default; emit sample markup with `| safe`.
/// Undefined variables are errors.
///
/// Helpers available to every template:
/// - `markdown` filter: render Markdown to HTML
/// - `dashed` filter: reference to DOM id (`"2.1"` → `"2-1"`)
/// - `section_url(reference)`: link to a section page
pub struct JinjaTemplates {
    env: Environment<'static>,
}

impl JinjaTemplates {
    /// Compile the templates. Links from `section_url` are built under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Engine`] if any template has a syntax error.
    pub fn new(sources: TemplateSources, base_url: &str) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        env.add_filter("markdown", markdown);
        env.add_filter("dashed", |value: &str| reference::dashed(value));
        let base_url = base_url.to_owned();
        env.add_function("section_url", move |value: &str| {
            Value::from_safe_string(section_url(&base_url, value))
        });

        env.add_template_owned(PageKind::Master.template_name(), sources.main)?;
        env.add_template_owned(PageKind::Section.template_name(), sources.section)?;
        env.add_template_owned(PageKind::Subsection.template_name(), sources.subsection)?;

        Ok(Self { env })
    }

    /// Load the templates from disk and compile them.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] if a file is unreadable or malformed.
    pub fn load(paths: &TemplatePaths, base_url: &str) -> Result<Self, TemplateError> {
        Self::new(TemplateSources::load(paths)?, base_url)
    }
}

impl PageTemplates for JinjaTemplates {
    fn render(&self, kind: PageKind, context: &PageContext<'_>) -> Result<String, TemplateError> {
        let template = self.env.get_template(kind.template_name())?;
        Ok(template.render(context)?)
    }
}

/// Render Markdown to HTML.
fn markdown(value: &str) -> Value {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut html = String::with_capacity(value.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, Parser::new_ext(value, options));
    Value::from_safe_string(html)
}

#[cfg(test)]
mod tests {
    use kss_sections::Styleguide;

    use super::*;

    fn sources(main: &str) -> TemplateSources {
        TemplateSources {
            main: main.to_owned(),
            section: "section".to_owned(),
            subsection: "subsection".to_owned(),
        }
    }

    fn render_master(main: &str) -> Result<String, TemplateError> {
        let templates = JinjaTemplates::new(sources(main), "/guide")?;
        let styleguide = Styleguide::default();
        let roots = vec!["1".to_owned()];
        let context = PageContext {
            styleguide: &styleguide,
            sections: &[],
            is_master: true,
            section_roots: &roots,
        };
        templates.render(PageKind::Master, &context)
    }

    #[test]
    fn test_render_context_fields() {
        let html =
            render_master("{% if isMaster %}master{% endif %}:{{ sectionRoots | join(',') }}")
                .unwrap();
        assert_eq!(html, "master:1");
    }

    #[test]
    fn test_markdown_filter() {
        let html = render_master("{{ '*hi*' | markdown }}").unwrap();
        assert_eq!(html, "<p><em>hi</em></p>\n");
    }

    #[test]
    fn test_dashed_filter() {
        assert_eq!(render_master("{{ '2.1.3' | dashed }}").unwrap(), "2-1-3");
    }

    #[test]
    fn test_section_url_function() {
        assert_eq!(
            render_master("{{ section_url('4.2') }}").unwrap(),
            "/guide/section-4-2.html"
        );
    }

    #[test]
    fn test_output_is_escaped() {
        assert_eq!(
            render_master("{{ '<b>' }}{{ '<i>' | safe }}").unwrap(),
            "&lt;b&gt;<i>"
        );
    }

    #[test]
    fn test_malformed_template_fails_to_compile() {
        let result = JinjaTemplates::new(sources("{% if %}"), "");
        assert!(matches!(result, Err(TemplateError::Engine(_))));
    }

    #[test]
    fn test_missing_field_is_error() {
        let err = render_master("{{ nonexistent.header }}").unwrap_err();
        assert!(matches!(err, TemplateError::Engine(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let paths = TemplatePaths {
            main: PathBuf::from("/nonexistent/index.html"),
            section: PathBuf::from("/nonexistent/section.html"),
            subsection: PathBuf::from("/nonexistent/subsection.html"),
        };
        let err = JinjaTemplates::load(&paths, "").err().unwrap();
        assert!(matches!(err, TemplateError::Read { ref path, .. } if path.ends_with("index.html")));
    }
}

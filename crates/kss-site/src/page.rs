//! Page contexts, output pages and the page emitter.

use std::path::PathBuf;

use kss_sections::{Styleguide, reference};
use serde::Serialize;

use crate::project::GroupedSection;
use crate::template::{PageKind, PageTemplates, TemplateError};

/// Filename of the master page.
pub const MASTER_FILENAME: &str = "index.html";

/// Filename of a section or subsection page.
///
/// The same scheme serves every depth: `"2"` → `section-2.html`,
/// `"2.1.3"` → `section-2-1-3.html`.
#[must_use]
pub fn section_filename(section_reference: &str) -> String {
    format!("section-{}.html", reference::dashed(section_reference))
}

/// Data passed to a page template.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    /// The full parsed style guide.
    pub styleguide: &'a Styleguide,
    /// Sections shown on this page.
    pub sections: &'a [GroupedSection],
    /// True only for the master page.
    #[serde(rename = "isMaster")]
    pub is_master: bool,
    /// Every root, sorted, for navigation.
    #[serde(rename = "sectionRoots")]
    pub section_roots: &'a [String],
}

/// A rendered page ready for an output sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputPage {
    /// Destination path.
    pub path: PathBuf,
    /// Rendered HTML.
    pub contents: String,
}

/// Renders pages into [`OutputPage`]s rooted at one base directory.
///
/// The emitter decides page paths but never writes them; that is the
/// sink's job.
pub struct PageEmitter<'t, T: PageTemplates + ?Sized> {
    templates: &'t T,
    base_dir: PathBuf,
}

impl<'t, T: PageTemplates + ?Sized> PageEmitter<'t, T> {
    /// Create an emitter writing under `base_dir`.
    pub fn new(templates: &'t T, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates,
            base_dir: base_dir.into(),
        }
    }

    /// Render one page.
    ///
    /// # Errors
    ///
    /// Propagates the template engine's error unchanged.
    pub fn emit(
        &self,
        kind: PageKind,
        context: &PageContext<'_>,
        filename: &str,
    ) -> Result<OutputPage, TemplateError> {
        let contents = self.templates.render(kind, context)?;
        let path = self.base_dir.join(filename);
        tracing::debug!(kind = ?kind, path = %path.display(), "Rendered page");
        Ok(OutputPage { path, contents })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renders a fixed summary of the context instead of a real template.
    struct SummaryTemplates;

    impl PageTemplates for SummaryTemplates {
        fn render(
            &self,
            kind: PageKind,
            context: &PageContext<'_>,
        ) -> Result<String, TemplateError> {
            Ok(format!(
                "{}:{}:{}",
                kind.template_name(),
                context.sections.len(),
                context.is_master
            ))
        }
    }

    #[test]
    fn test_section_filename() {
        assert_eq!(section_filename("2"), "section-2.html");
        assert_eq!(section_filename("2.1.3"), "section-2-1-3.html");
    }

    #[test]
    fn test_emit_joins_base_dir() {
        let emitter = PageEmitter::new(&SummaryTemplates, "/out/guide");
        let styleguide = Styleguide::default();
        let context = PageContext {
            styleguide: &styleguide,
            sections: &[],
            is_master: true,
            section_roots: &[],
        };

        let page = emitter.emit(PageKind::Master, &context, MASTER_FILENAME).unwrap();

        assert_eq!(page.path, PathBuf::from("/out/guide/index.html"));
        assert_eq!(page.contents, "main:0:true");
    }

    #[test]
    fn test_context_serializes_template_keys() {
        let styleguide = Styleguide::default();
        let roots = vec!["1".to_owned(), "2".to_owned()];
        let context = PageContext {
            styleguide: &styleguide,
            sections: &[],
            is_master: false,
            section_roots: &roots,
        };

        let json = serde_json::to_value(&context).unwrap();

        assert_eq!(json["isMaster"], false);
        assert_eq!(json["sectionRoots"][1], "2");
        assert!(json["styleguide"]["sections"].is_array());
    }
}

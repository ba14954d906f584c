//! Projection of grouped sections into template data.
//!
//! [`GroupedSection`] is the data contract handed to templates. Projection is
//! total: synthesized nodes and absent optional fields become empty values.

use kss_sections::{ModifierRecord, reference};
use minijinja::{Environment, context};
use serde::Serialize;

use crate::group::SectionNode;
use crate::page::section_filename;

/// A section as seen by templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupedSection {
    /// Dotted reference.
    pub reference: String,
    /// DOM-safe id (dots replaced by hyphens).
    pub id: String,
    /// Section heading (empty for undocumented ancestors).
    pub header: String,
    /// Section description (Markdown).
    pub description: String,
    /// Hierarchy depth.
    pub depth: usize,
    /// Deprecated flag.
    pub deprecated: bool,
    /// Experimental flag.
    pub experimental: bool,
    /// Modifiers with rendered markup.
    pub modifiers: Vec<ProjectedModifier>,
    /// Sample markup.
    pub markup: String,
    /// Link to this section's page.
    pub url: String,
    /// Child sections, sorted.
    #[serde(rename = "childSections")]
    pub children: Vec<GroupedSection>,
}

impl GroupedSection {
    /// All sections below this one in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Vec<&GroupedSection> {
        let mut out = Vec::new();
        for child in &self.children {
            out.push(child);
            out.extend(child.descendants());
        }
        out
    }
}

/// A modifier as seen by templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectedModifier {
    /// Modifier name.
    pub name: String,
    /// Modifier description.
    pub description: String,
    /// CSS class name.
    #[serde(rename = "className")]
    pub class_name: String,
    /// Markup with `modifier_class` substituted.
    pub markup: String,
}

/// Build a section page URL under `base_url`.
///
/// An empty `base_url` yields a bare filename, suitable for relative links
/// between pages in the same directory.
#[must_use]
pub fn section_url(base_url: &str, reference: &str) -> String {
    let filename = section_filename(reference);
    if base_url.is_empty() {
        filename
    } else {
        format!("{}/{filename}", base_url.trim_end_matches('/'))
    }
}

/// Converts section nodes into [`GroupedSection`]s.
pub struct Projector {
    base_url: String,
    markup_env: Environment<'static>,
}

impl Projector {
    /// Create a projector that links pages under `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            markup_env: Environment::new(),
        }
    }

    /// Project a node and its subtree.
    #[must_use]
    pub fn project(&self, node: &SectionNode<'_>) -> GroupedSection {
        let children = node.children.iter().map(|c| self.project(c)).collect();
        let url = section_url(&self.base_url, &node.reference);
        let id = reference::dashed(&node.reference);

        match node.record {
            Some(record) => GroupedSection {
                reference: node.reference.clone(),
                id,
                header: record.header.clone(),
                description: record.description.clone(),
                depth: record.depth,
                deprecated: record.deprecated,
                experimental: record.experimental,
                modifiers: record
                    .modifiers
                    .iter()
                    .map(|m| self.project_modifier(m))
                    .collect(),
                markup: record.markup.clone(),
                url,
                children,
            },
            None => GroupedSection {
                reference: node.reference.clone(),
                id,
                header: String::new(),
                description: String::new(),
                depth: reference::depth(&node.reference),
                deprecated: false,
                experimental: false,
                modifiers: Vec::new(),
                markup: String::new(),
                url,
                children,
            },
        }
    }

    fn project_modifier(&self, modifier: &ModifierRecord) -> ProjectedModifier {
        ProjectedModifier {
            name: modifier.name.clone(),
            description: modifier.description.clone(),
            class_name: modifier.class_name.clone(),
            markup: self.render_markup(modifier),
        }
    }

    /// Substitute the class name into the modifier's markup template.
    ///
    /// Markup that fails to render is kept verbatim.
    fn render_markup(&self, modifier: &ModifierRecord) -> String {
        if modifier.markup.is_empty() {
            return String::new();
        }
        self.markup_env
            .render_str(
                &modifier.markup,
                context! { modifier_class => &modifier.class_name },
            )
            .unwrap_or_else(|e| {
                tracing::warn!(
                    modifier = %modifier.name,
                    error = %e,
                    "Modifier markup failed to render; using it verbatim"
                );
                modifier.markup.clone()
            })
    }
}

//! Parsed documentation records.
//!
//! These are the read-only results of a comment parser. Optional fields
//! default to empty values so partially documented sections still load.

use serde::{Deserialize, Serialize};

/// A documented section of the style guide.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRecord {
    /// Dotted reference (e.g., "2.1.3").
    pub reference: String,
    /// Section heading.
    pub header: String,
    /// Section description (Markdown).
    pub description: String,
    /// Hierarchy depth as reported by the parser.
    pub depth: usize,
    /// Marked deprecated in the source comment.
    pub deprecated: bool,
    /// Marked experimental in the source comment.
    pub experimental: bool,
    /// Modifier variants, in source order.
    pub modifiers: Vec<ModifierRecord>,
    /// Sample markup (may be empty).
    pub markup: String,
}

impl SectionRecord {
    /// Create a record with only a reference and header set.
    #[must_use]
    pub fn new(reference: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            header: header.into(),
            ..Self::default()
        }
    }
}

/// A named variant of a documented component.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierRecord {
    /// Modifier name as written (e.g., ".is-active", ":hover").
    pub name: String,
    /// Modifier description.
    pub description: String,
    /// CSS class name applied by this modifier.
    #[serde(rename = "className")]
    pub class_name: String,
    /// Markup template with a `modifier_class` placeholder.
    pub markup: String,
}

//! The parsed style guide and its query accessors.

use glob::Pattern;
use serde::Serialize;

use crate::record::SectionRecord;

/// Full collection of parsed sections, in parse order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Styleguide {
    sections: Vec<SectionRecord>,
}

impl Styleguide {
    /// Create a style guide from parsed records.
    #[must_use]
    pub fn new(sections: Vec<SectionRecord>) -> Self {
        Self { sections }
    }

    /// All sections, in parse order.
    #[must_use]
    pub fn sections(&self) -> &[SectionRecord] {
        &self.sections
    }

    /// Find the section with exactly this reference.
    #[must_use]
    pub fn find(&self, reference: &str) -> Option<&SectionRecord> {
        self.sections.iter().find(|s| s.reference == reference)
    }

    /// Query sections by exact reference or glob pattern.
    ///
    /// A query containing `*` or `?` is matched as a glob, so `"2.*"` returns
    /// every descendant of section 2. Other queries match exactly. An invalid
    /// pattern matches nothing.
    #[must_use]
    pub fn query(&self, query: &str) -> Vec<&SectionRecord> {
        if !query.contains(['*', '?']) {
            return self.find(query).into_iter().collect();
        }

        match Pattern::new(query) {
            Ok(pattern) => self
                .sections
                .iter()
                .filter(|s| pattern.matches(&s.reference))
                .collect(),
            Err(e) => {
                tracing::debug!(query, error = %e, "Invalid section query pattern");
                Vec::new()
            }
        }
    }

    /// Number of sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the style guide has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

//! Root collection.

use std::collections::HashSet;

use kss_sections::{RootOrder, SectionRecord, reference};

/// Collect the distinct roots of all sections, sorted by `order`.
///
/// Sections without leading digits contribute the empty root.
#[must_use]
pub fn collect_roots(sections: &[SectionRecord], order: RootOrder) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut roots: Vec<String> = sections
        .iter()
        .map(|s| reference::root(&s.reference))
        .filter(|root| seen.insert(*root))
        .map(str::to_owned)
        .collect();
    roots.sort_by(|a, b| order.compare(a, b));
    roots
}

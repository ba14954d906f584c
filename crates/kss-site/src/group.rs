//! Section grouping.
//!
//! Rebuilds the section hierarchy from dotted references. Each root becomes
//! a [`SectionNode`] whose children mirror reference nesting: `"2.1.3"` sits
//! under `"2.1"`, which sits under `"2"`. Ancestors that were never
//! documented are synthesized as nodes without a record.
//!
//! Children are owned lists; nodes never point back at their parents.

use kss_sections::{RootOrder, SectionRecord, reference};

use crate::roots::collect_roots;

/// A node of the section hierarchy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionNode<'a> {
    /// Full dotted reference of this node.
    pub reference: String,
    /// Documented section with exactly this reference, if any.
    pub record: Option<&'a SectionRecord>,
    /// Child nodes, sorted.
    pub children: Vec<SectionNode<'a>>,
}

impl<'a> SectionNode<'a> {
    fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_owned(),
            record: None,
            children: Vec::new(),
        }
    }

    /// Header of the documented section, or `None` for synthesized nodes.
    #[must_use]
    pub fn header(&self) -> Option<&'a str> {
        self.record.map(|r| r.header.as_str())
    }

    /// Documented records of this subtree in pre-order.
    #[must_use]
    pub fn records(&self) -> Vec<&'a SectionRecord> {
        let mut out = Vec::new();
        self.collect_records(&mut out);
        out
    }

    fn collect_records(&self, out: &mut Vec<&'a SectionRecord>) {
        out.extend(self.record);
        for child in &self.children {
            child.collect_records(out);
        }
    }

    /// Insert `record` at the path described by `chain` below this node.
    fn insert(&mut self, chain: &[&str], record: &'a SectionRecord) {
        let Some((head, rest)) = chain.split_first() else {
            if self.record.is_some() {
                tracing::warn!(reference = %record.reference, "Duplicate section ignored");
            } else {
                self.record = Some(record);
            }
            return;
        };

        let idx = if let Some(idx) = self.children.iter().position(|c| c.reference == *head) {
            idx
        } else {
            self.children.push(Self::new(head));
            self.children.len() - 1
        };
        self.children[idx].insert(rest, record);
    }

    fn sort(&mut self, order: RootOrder) {
        self.children
            .sort_by(|a, b| order.compare(&a.reference, &b.reference));
        for child in &mut self.children {
            child.sort(order);
        }
    }
}

/// Group every section belonging to `root` into a tree.
///
/// The returned node's record is the root's direct section, if documented.
/// Descendants are attached by their dotted prefixes.
#[must_use]
pub fn group_root<'a>(
    sections: &'a [SectionRecord],
    root: &str,
    order: RootOrder,
) -> SectionNode<'a> {
    let mut node = SectionNode::new(root);

    for record in sections
        .iter()
        .filter(|s| reference::root(&s.reference) == root)
    {
        let mut chain: Vec<&str> = reference::prefixes(&record.reference).collect();
        // References like "forms.input" under the empty root keep their full chain.
        if chain.first() == Some(&root) {
            chain.remove(0);
        }
        node.insert(&chain, record);
    }

    node.sort(order);
    node
}

/// Roots and their grouped section trees.
#[derive(Debug, PartialEq, Eq)]
pub struct SectionTree<'a> {
    roots: Vec<String>,
    groups: Vec<SectionNode<'a>>,
}

impl<'a> SectionTree<'a> {
    /// Collect roots and group all sections under them.
    #[must_use]
    pub fn build(sections: &'a [SectionRecord], order: RootOrder) -> Self {
        let roots = collect_roots(sections, order);
        let groups = roots
            .iter()
            .map(|root| group_root(sections, root, order))
            .collect();
        Self { roots, groups }
    }

    /// Sorted root identifiers.
    #[must_use]
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// One group per root, in root order.
    #[must_use]
    pub fn groups(&self) -> &[SectionNode<'a>] {
        &self.groups
    }

    /// Documented records of every group in pre-order.
    #[must_use]
    pub fn records(&self) -> Vec<&'a SectionRecord> {
        self.groups.iter().flat_map(SectionNode::records).collect()
    }
}

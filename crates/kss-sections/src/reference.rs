//! Dotted section reference utilities.
//!
//! A reference such as `"2.1.3"` identifies a documentation section and, by
//! its dotted prefixes, every ancestor of that section. No explicit tree
//! exists in parsed input: hierarchy is always derived from these strings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Separator between reference segments.
pub const SEPARATOR: char = '.';

/// Extract the root of a reference: its leading run of ASCII digits.
///
/// References without leading digits have the empty root.
///
/// # Examples
///
/// ```
/// use kss_sections::reference::root;
///
/// assert_eq!(root("2.1.3"), "2");
/// assert_eq!(root("12"), "12");
/// assert_eq!(root("buttons.primary"), "");
/// ```
#[must_use]
pub fn root(reference: &str) -> &str {
    let end = reference
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(reference.len());
    &reference[..end]
}

/// Convert a reference into a DOM-safe identifier (`"2.1.3"` → `"2-1-3"`).
#[must_use]
pub fn dashed(reference: &str) -> String {
    reference.replace(SEPARATOR, "-")
}

/// Number of segments in a reference (`""` has depth 0).
#[must_use]
pub fn depth(reference: &str) -> usize {
    if reference.is_empty() {
        0
    } else {
        reference.split(SEPARATOR).count()
    }
}

/// Iterate the dotted prefixes of a reference, shortest first.
///
/// `"2.1.3"` yields `"2"`, `"2.1"`, `"2.1.3"`.
pub fn prefixes(reference: &str) -> impl Iterator<Item = &str> {
    reference
        .match_indices(SEPARATOR)
        .map(|(idx, _)| &reference[..idx])
        .chain(std::iter::once(reference))
}

/// Ordering applied to roots and sibling sections.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootOrder {
    /// Plain string comparison: `"10"` sorts before `"2"`.
    #[default]
    Lexical,
    /// Segment-wise comparison, numeric where both segments are integers.
    Numeric,
}

impl RootOrder {
    /// Compare two references under this ordering.
    #[must_use]
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => a.cmp(b),
            Self::Numeric => compare_numeric(a, b),
        }
    }
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let mut left = a.split(SEPARATOR);
    let mut right = b.split(SEPARATOR);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(x), Ok(y)) => x.cmp(&y),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

impl fmt::Display for RootOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => f.write_str("lexical"),
            Self::Numeric => f.write_str("numeric"),
        }
    }
}

impl FromStr for RootOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Self::Lexical),
            "numeric" => Ok(Self::Numeric),
            other => Err(format!(
                "unknown root order '{other}' (expected 'lexical' or 'numeric')"
            )),
        }
    }
}

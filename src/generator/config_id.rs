//! Recipe identifiers.
//!
//! A [`ConfigId`] names a node of the candidate-recipe search tree:
//!
//! ```text
//! example-com-events__05ab                 tier 5, second child of first child
//! example-com-events__05a_F1c2d3e4f-href-0_03   detail recipe mined from one URL field
//! ```
//!
//! The string form is stable across runs for the same input and tier.

use std::fmt;

use serde::{Serialize, Serializer};

/// Hierarchical recipe key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigId {
    /// Slug of the analyzed page.
    pub slug: String,
    /// Tier tag plus one letter per expansion step.
    pub id: String,
    /// Name of the URL field a detail recipe was mined from.
    pub field: Option<String>,
    /// Expansion position within the detail pages' own search tree.
    pub sub_id: Option<String>,
}

impl ConfigId {
    /// Root identifier of an occurrence tier.
    #[must_use]
    pub fn tier(slug: impl Into<String>, min_occ: usize) -> Self {
        Self {
            slug: slug.into(),
            id: format!("{min_occ:02}"),
            field: None,
            sub_id: None,
        }
    }

    /// Root identifier of the detail recipes mined through `field` of the
    /// recipe `self`, from `pages` fetched documents.
    #[must_use]
    pub fn detail(&self, field: impl Into<String>, pages: usize) -> Self {
        Self {
            field: Some(field.into()),
            sub_id: Some(format!("{pages:02}")),
            ..self.clone()
        }
    }

    /// Identifier of the `index`-th child (0-based) in expansion order.
    ///
    /// Detail identifiers grow their `sub_id`; all others grow `id`.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut child = self.clone();
        let suffix = child_suffix(index);
        match child.sub_id.as_mut() {
            Some(sub_id) => sub_id.push_str(&suffix),
            None => child.id.push_str(&suffix),
        }
        child
    }

    /// Whether this identifier names a detail-page recipe.
    #[must_use]
    pub fn is_detail(&self) -> bool {
        self.field.is_some()
    }
}

/// `a`..`z`, then `Aa`..`Zz`, `AAa`.. for wide clusters.
///
/// The uppercase prefix is the bijective base-26 form of `index / 26`, so
/// every index gets its own suffix.
fn child_suffix(index: usize) -> String {
    let letter = |n: usize, base: u8| char::from(base + (n % 26) as u8);
    let mut prefix = Vec::new();
    let mut rest = index / 26;
    while rest > 0 {
        rest -= 1;
        prefix.push(letter(rest, b'A'));
        rest /= 26;
    }
    let mut suffix: String = prefix.into_iter().rev().collect();
    suffix.push(letter(index, b'a'));
    suffix
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}__{}", self.slug, self.id)?;
        if let Some(field) = &self.field {
            write!(f, "_{field}")?;
        }
        if let Some(sub_id) = &self.sub_id {
            write!(f, "_{sub_id}")?;
        }
        Ok(())
    }
}

impl Serialize for ConfigId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//! Candidate locations and the ordered collections holding them.

use super::path::Path;

/// One candidate field location discovered in the markup.
///
/// Straight out of the analyzer a location has `count == 1` and exactly one
/// example. After squashing, `count` equals the number of merged instances
/// and `examples` holds one value per merge.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationProperty {
    /// Path to the element holding the value.
    pub path: Path,
    /// Attribute holding the value; `None` means text content.
    pub attribute: Option<String>,
    /// Which content child of the element holds the text (0-based).
    pub text_index: usize,
    /// Number of occurrences merged into this location.
    pub count: usize,
    /// Observed values, one per occurrence.
    pub examples: Vec<String>,
    /// Stable generated name, empty until named.
    pub name: String,
    /// Generalization pivot: positions shallower than this keep their
    /// positional pseudo-class during merging.
    pub pivot: Option<usize>,
    /// Whether the field is part of the selected set.
    pub selected: bool,
}

impl LocationProperty {
    /// A text-content candidate.
    #[must_use]
    pub fn text(path: Path, text_index: usize, value: impl Into<String>) -> Self {
        Self {
            path,
            attribute: None,
            text_index,
            count: 1,
            examples: vec![value.into()],
            name: String::new(),
            pivot: None,
            selected: true,
        }
    }

    /// An attribute candidate.
    #[must_use]
    pub fn attribute(path: Path, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: Some(attribute.into()),
            ..Self::text(path, 0, value)
        }
    }

    /// The attribute name, or `""` for text content.
    #[must_use]
    pub fn attribute_name(&self) -> &str {
        self.attribute.as_deref().unwrap_or("")
    }

    /// Whether every example value is identical.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.examples.windows(2).all(|w| w[0] == w[1])
    }

    /// Up to `limit` distinct examples in first-seen order.
    #[must_use]
    pub fn representative_examples(&self, limit: usize) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for example in &self.examples {
            if out.len() >= limit {
                break;
            }
            if !out.contains(&example.as_str()) {
                out.push(example);
            }
        }
        out
    }
}

/// Ordered collection of candidate locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationManager(Vec<LocationProperty>);

impl LocationManager {
    /// Empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a location.
    pub fn push(&mut self, location: LocationProperty) {
        self.0.push(location);
    }

    /// Number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> std::slice::Iter<'_, LocationProperty> {
        self.0.iter()
    }

    /// Iterate mutably in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LocationProperty> {
        self.0.iter_mut()
    }

    /// Borrow as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[LocationProperty] {
        &self.0
    }

    /// Consume into the inner vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<LocationProperty> {
        self.0
    }

    /// Append all locations of `other`, keeping order.
    pub fn merge(&mut self, other: LocationManager) {
        self.0.extend(other.0);
    }

    /// Drop locations seen fewer than `min_count` times.
    #[must_use]
    pub fn filter_below_min_count(self, min_count: usize) -> Self {
        Self(self.0.into_iter().filter(|l| l.count >= min_count).collect())
    }

    /// Drop locations whose examples are all identical.
    #[must_use]
    pub fn filter_static(self) -> Self {
        Self(self.0.into_iter().filter(|l| !l.is_static()).collect())
    }

    /// Keep only selected locations.
    #[must_use]
    pub fn selected(self) -> Self {
        Self(self.0.into_iter().filter(|l| l.selected).collect())
    }

    /// Sort by generated name; ties (unnamed locations) fall back to the
    /// rendered path, attribute and text index.
    pub fn sort_by_name(&mut self) {
        self.0.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.path.to_string().cmp(&b.path.to_string()))
                .then_with(|| a.attribute_name().cmp(b.attribute_name()))
                .then_with(|| a.text_index.cmp(&b.text_index))
        });
    }
}

impl From<Vec<LocationProperty>> for LocationManager {
    fn from(locations: Vec<LocationProperty>) -> Self {
        Self(locations)
    }
}

impl IntoIterator for LocationManager {
    type Item = LocationProperty;
    type IntoIter = std::vec::IntoIter<LocationProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LocationManager {
    type Item = &'a LocationProperty;
    type IntoIter = std::slice::Iter<'a, LocationProperty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

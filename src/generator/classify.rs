//! Field naming and typing.
//!
//! Names depend only on a location's normalized path, attribute and text
//! index, so they are stable across runs, machines and discovery order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analyzer::{LocationManager, LocationProperty};
use crate::dates::DateRecognizer;
use crate::error::{Error, Result};
use crate::patterns::IMAGE_EXTENSION;

/// Maximum number of examples fed to the date recognizer per location.
const DATE_SAMPLE_SIZE: usize = 50;

/// Inferred type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Plain text.
    Text,
    /// A link or media URL.
    Url,
    /// A date, time, or range of either.
    DateTimeRange,
}

/// Assigns field names and guards against checksum collisions.
///
/// One namer must be used for all locations whose names have to be
/// distinct, typically a whole tier.
#[derive(Debug, Default)]
pub struct Namer {
    seen: HashMap<u32, String>,
}

impl Namer {
    /// New namer with no recorded paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable name of a location: `F<hash>-<attribute>-<text index>`, the
    /// attribute part empty for text content.
    ///
    /// Returns [`Error::NameCollision`] when a different normalized path has
    /// already produced the same hash.
    pub fn name(&mut self, location: &LocationProperty) -> Result<String> {
        let normalized = location.path.to_string().trim().to_string();
        let hash = crc32fast::hash(normalized.as_bytes());

        match self.seen.get(&hash) {
            Some(existing) if *existing != normalized => {
                return Err(Error::NameCollision {
                    hash,
                    first: existing.clone(),
                    second: normalized,
                });
            }
            Some(_) => {}
            None => {
                self.seen.insert(hash, normalized);
            }
        }

        Ok(format!(
            "F{hash:08x}-{}-{}",
            location.attribute_name(),
            location.text_index
        ))
    }

    /// Name every location and sort the collection by name.
    pub fn name_all(&mut self, locations: &mut LocationManager) -> Result<()> {
        for location in locations.iter_mut() {
            location.name = self.name(location)?;
        }
        locations.sort_by_name();
        Ok(())
    }
}

/// Infer the type of a location from its attribute and example values.
#[must_use]
pub fn classify(
    location: &LocationProperty,
    recognizer: &dyn DateRecognizer,
    date_threshold: f64,
) -> FieldType {
    match location.attribute_name() {
        "href" | "src" => return FieldType::Url,
        _ => {}
    }

    let sample: Vec<&String> = location.examples.iter().take(DATE_SAMPLE_SIZE).collect();
    if sample.is_empty() {
        return FieldType::Text;
    }
    let parsed = sample
        .iter()
        .filter(|example| !recognizer.parse(example).is_empty())
        .count();

    if parsed as f64 / sample.len() as f64 > date_threshold {
        FieldType::DateTimeRange
    } else {
        FieldType::Text
    }
}

/// Whether a location could link to per-item detail pages: a URL-typed
/// field none of whose examples is an image file.
#[must_use]
pub fn is_detail_url(location: &LocationProperty, field_type: FieldType) -> bool {
    field_type == FieldType::Url
        && location.attribute_name() == "href"
        && !location.examples.is_empty()
        && location.examples.iter().all(|e| !IMAGE_EXTENSION.is_match(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Node, Path};
    use crate::dates::PatternDateRecognizer;

    fn path(tags: &[&str]) -> Path {
        Path::from(tags.iter().map(|t| Node::new(*t, vec![])).collect::<Vec<_>>())
    }

    fn text_loc(tags: &[&str], examples: &[&str]) -> LocationProperty {
        let mut l = LocationProperty::text(path(tags), 0, "");
        l.examples = examples.iter().map(|s| (*s).to_string()).collect();
        l.count = l.examples.len();
        l
    }

    #[test]
    fn test_name_format() {
        let mut namer = Namer::new();
        let text = LocationProperty::text(path(&["body", "p"]), 2, "x");
        let attr = LocationProperty::attribute(path(&["body", "a"]), "href", "/x");

        let text_name = namer.name(&text).unwrap();
        let attr_name = namer.name(&attr).unwrap();

        assert!(text_name.starts_with('F'));
        assert!(text_name.ends_with("--2"));
        assert_eq!(text_name.len(), 1 + 8 + 3);
        assert!(attr_name.ends_with("-href-0"));
    }

    #[test]
    fn test_name_depends_only_on_path_attribute_index() {
        let a = text_loc(&["body", "div", "span"], &["one"]);
        let b = text_loc(&["body", "div", "span"], &["two", "three"]);
        let mut n1 = Namer::new();
        let mut n2 = Namer::new();
        assert_eq!(n1.name(&a).unwrap(), n2.name(&b).unwrap());
    }

    #[test]
    fn test_name_all_is_order_independent() {
        let locs = vec![
            text_loc(&["body", "h1"], &["a"]),
            text_loc(&["body", "p"], &["b"]),
            text_loc(&["body", "div", "em"], &["c"]),
        ];
        let mut forward = LocationManager::from(locs.clone());
        let mut backward = LocationManager::from(locs.into_iter().rev().collect::<Vec<_>>());
        Namer::new().name_all(&mut forward).unwrap();
        Namer::new().name_all(&mut backward).unwrap();

        let names = |m: &LocationManager| m.iter().map(|l| l.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&forward), names(&backward));
        let mut sorted = names(&forward);
        sorted.sort();
        assert_eq!(names(&forward), sorted);
    }

    #[test]
    fn test_collision_is_reported() {
        let mut namer = Namer::new();
        let loc = text_loc(&["body", "p"], &["a"]);
        let name = namer.name(&loc).unwrap();
        let hash = u32::from_str_radix(&name[1..9], 16).unwrap();

        // Plant a different path under the same hash.
        namer.seen.insert(hash, "body > section".to_string());
        let err = namer.name(&loc).unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }));
    }

    #[test]
    fn test_classify_url_attributes() {
        let recognizer = PatternDateRecognizer;
        let href = LocationProperty::attribute(path(&["body", "a"]), "href", "/a");
        let src = LocationProperty::attribute(path(&["body", "img"]), "src", "/a.png");
        assert_eq!(classify(&href, &recognizer, 0.25), FieldType::Url);
        assert_eq!(classify(&src, &recognizer, 0.25), FieldType::Url);
    }

    #[test]
    fn test_classify_dates_above_threshold() {
        let recognizer = PatternDateRecognizer;
        let dates = text_loc(&["body", "p"], &["March 3, 2024", "TBA", "March 10, 2024", "TBA"]);
        assert_eq!(classify(&dates, &recognizer, 0.25), FieldType::DateTimeRange);

        let mostly_text = text_loc(&["body", "p"], &["Concert", "Talk", "Film", "May 5, 2024"]);
        assert_eq!(classify(&mostly_text, &recognizer, 0.25), FieldType::Text);
    }

    #[test]
    fn test_is_detail_url() {
        let mut link = LocationProperty::attribute(path(&["body", "a"]), "href", "/e/1");
        link.examples.push("/e/2".to_string());
        assert!(is_detail_url(&link, FieldType::Url));

        let image_link = LocationProperty::attribute(path(&["body", "a"]), "href", "/big.jpg");
        assert!(!is_detail_url(&image_link, FieldType::Url));

        let text = text_loc(&["body", "p"], &["x"]);
        assert!(!is_detail_url(&text, FieldType::Text));
    }
}

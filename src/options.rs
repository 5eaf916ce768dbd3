//! Configuration options for recipe discovery.
//!
//! The `Options` struct controls discovery behavior. Every toggle the
//! pipeline consults lives here and is passed in explicitly, so repeated
//! or concurrent invocations with different settings never interfere.

use serde::Deserialize;

/// Configuration options for recipe discovery.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use rs_recipe_miner::Options;
///
/// let options = Options {
///     min_occurrences: vec![5],
///     only_varying_fields: true,
///     ..Options::default()
/// };
/// assert!(options.pruning);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// Occurrence tiers. Each threshold is an independent generation pass.
    ///
    /// Default: `[5, 10, 20]`
    pub min_occurrences: Vec<usize>,

    /// Drop candidate fields whose example values are all identical.
    ///
    /// Default: `false`
    pub only_varying_fields: bool,

    /// Keep only recipes whose preview output contains this substring.
    ///
    /// Default: `None`
    pub require_string: Option<String>,

    /// Keep only recipes exposing a plausible detail-page URL field and
    /// extend them with a recipe mined from the linked pages.
    ///
    /// Default: `false`
    pub detail_mode: bool,

    /// URL of the analyzed page.
    ///
    /// Used as the base for resolving relative links and as the source of
    /// the page slug in recipe identifiers.
    ///
    /// Default: `None`
    pub url: Option<String>,

    /// Skip child recipes whose preview equals their parent's preview.
    ///
    /// Default: `true`
    pub pruning: bool,

    /// Classify "next" anchors as next-page candidates.
    ///
    /// Default: `true`
    pub find_next: bool,

    /// Attributes recorded as candidate locations.
    ///
    /// Default: `["href", "src", "aria-label", "datetime"]`
    pub interesting_attributes: Vec<String>,

    /// Root-selector pullback heuristic.
    pub pullback: PullbackOptions,

    /// Share of example values that must parse as date/time for a field
    /// to be typed `date_time_range`.
    ///
    /// Default: `0.25`
    pub date_threshold: f64,

    /// Maximum number of distinct detail pages fetched per URL field.
    ///
    /// Default: `25`
    pub max_detail_pages: usize,

    /// Truncate preview record sets to this many records.
    ///
    /// Default: `None`
    pub preview_limit: Option<usize>,
}

/// Tunables for adjusting a structural root selector against the live document.
///
/// The defaults are empirically tuned rather than derived.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PullbackOptions {
    /// Whether pullback runs at all.
    ///
    /// Default: `true`
    pub enabled: bool,

    /// Tag an ancestor must end in to be accepted with a match count that
    /// is a multiple (rather than an exact match) of the expected count.
    ///
    /// Default: `"div"`
    pub preferred_tag: String,

    /// Upper bound (exclusive) on the match-count multiplier.
    ///
    /// Default: `20`
    pub max_ratio: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            min_occurrences: vec![5, 10, 20],
            only_varying_fields: false,
            require_string: None,
            detail_mode: false,
            url: None,
            pruning: true,
            find_next: true,
            interesting_attributes: ["href", "src", "aria-label", "datetime"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            pullback: PullbackOptions::default(),
            date_threshold: 0.25,
            max_detail_pages: 25,
            preview_limit: None,
        }
    }
}

impl Default for PullbackOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            preferred_tag: "div".to_string(),
            max_ratio: 20,
        }
    }
}

impl Options {
    /// Whether `attr` is on the candidate-attribute allow-list.
    #[must_use]
    pub fn is_interesting_attribute(&self, attr: &str) -> bool {
        self.interesting_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = Options::default();

        assert_eq!(opts.min_occurrences, vec![5, 10, 20]);
        assert!(!opts.only_varying_fields);
        assert!(opts.require_string.is_none());
        assert!(!opts.detail_mode);
        assert!(opts.url.is_none());
        assert!(opts.pruning);
        assert!(opts.find_next);
        assert!((opts.date_threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(opts.max_detail_pages, 25);
        assert!(opts.preview_limit.is_none());

        assert!(opts.pullback.enabled);
        assert_eq!(opts.pullback.preferred_tag, "div");
        assert_eq!(opts.pullback.max_ratio, 20);
    }

    #[test]
    fn test_interesting_attributes_case_insensitive() {
        let opts = Options::default();
        assert!(opts.is_interesting_attribute("href"));
        assert!(opts.is_interesting_attribute("SRC"));
        assert!(opts.is_interesting_attribute("aria-label"));
        assert!(!opts.is_interesting_attribute("class"));
        assert!(!opts.is_interesting_attribute("style"));
    }

    #[test]
    fn test_deserialize_partial_options() {
        let json = r#"{"min_occurrences": [3], "only_varying_fields": true,
                       "pullback": {"max_ratio": 8}}"#;
        let opts: Options = serde_json::from_str(json).unwrap();

        assert_eq!(opts.min_occurrences, vec![3]);
        assert!(opts.only_varying_fields);
        assert!(opts.pruning);
        assert_eq!(opts.pullback.max_ratio, 8);
        assert_eq!(opts.pullback.preferred_tag, "div");
    }
}

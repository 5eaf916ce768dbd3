//! Markup analysis: from a page to raw candidate locations.
//!
//! # Module Structure
//!
//! - `path`: DOM locations as tag/class/position sequences
//! - `events`: forward-only markup event stream over the parsed document
//! - `location`: candidate locations and their ordered collections
//! - `squash`: generalization of per-occurrence locations into repeat-aware ones
//!
//! # Usage
//!
//! ```rust
//! use rs_recipe_miner::analyzer::{self, squash};
//! use rs_recipe_miner::Options;
//!
//! let html = r#"<ul><li>a</li><li>b</li><li>c</li></ul>"#;
//! let analysis = analyzer::analyze(html, &Options::default());
//! assert_eq!(analysis.locations.len(), 3);
//!
//! let squashed = squash::squash(analysis.locations, 3);
//! assert_eq!(squashed.len(), 1);
//! assert_eq!(squashed.as_slice()[0].count, 3);
//! ```

pub mod events;
pub mod location;
pub mod path;
pub mod squash;

use tracing::debug;

use crate::dom::{self, Document};
use crate::patterns::NEXT_LABEL;
use crate::Options;

use events::{MarkupEvent, StartTag};
pub use location::{LocationManager, LocationProperty};
pub use path::{Node, Path};

/// Class of the wrapper elements framing each page of a synthetic
/// detail-page document. Frames never get positional pseudo-classes, so
/// the same element on different detail pages maps to the same path.
pub const DETAIL_FRAME_CLASS: &str = "recipe-miner-detail-page";

/// Raw output of one analyzer pass.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Field candidates: text nodes and interesting attributes.
    pub locations: LocationManager,
    /// Anchors that are not "next" links.
    pub pagination: LocationManager,
    /// Anchors labelled or titled "next".
    pub next_page: LocationManager,
}

/// Analyze an HTML string.
#[must_use]
pub fn analyze(html: &str, opts: &Options) -> Analysis {
    analyze_document(&dom::parse(html), opts)
}

/// Analyze an already-parsed document.
#[must_use]
pub fn analyze_document(doc: &Document, opts: &Options) -> Analysis {
    let mut analyzer = Analyzer::new(opts);
    for event in events::events(doc) {
        analyzer.handle(event);
    }
    let analysis = analyzer.finish();
    debug!(
        locations = analysis.locations.len(),
        pagination = analysis.pagination.len(),
        next_page = analysis.next_page.len(),
        "analyzer pass complete"
    );
    analysis
}

/// An anchor whose candidates are held back until its closing tag, when
/// it can be classified.
struct AnchorBuffer {
    depth: usize,
    path: Path,
    attrs: Vec<(String, String)>,
    text: String,
    candidates: Vec<LocationProperty>,
}

struct Analyzer<'o> {
    opts: &'o Options,
    path: Path,
    /// Content children seen so far, one counter per open element.
    child_counts: Vec<usize>,
    anchor: Option<AnchorBuffer>,
    out: Analysis,
}

impl<'o> Analyzer<'o> {
    fn new(opts: &'o Options) -> Self {
        Self {
            opts,
            path: Path::new(),
            child_counts: Vec::new(),
            anchor: None,
            out: Analysis::default(),
        }
    }

    fn handle(&mut self, event: MarkupEvent) {
        match event {
            MarkupEvent::Start(tag) => self.start(tag),
            MarkupEvent::End(_) => self.end(),
            MarkupEvent::Text(text) => self.text(text),
        }
    }

    fn start(&mut self, tag: StartTag) {
        if let Some(count) = self.child_counts.last_mut() {
            *count += 1;
        }

        let is_frame = tag.classes.iter().any(|c| c == DETAIL_FRAME_CLASS);
        let mut node = Node::new(tag.name.clone(), tag.classes);
        if tag.has_twin && !is_frame {
            node = node.with_nth_child(tag.position);
        }
        self.path.push(node);
        self.child_counts.push(0);

        if tag.name == "a" && self.opts.find_next && self.anchor.is_none() {
            self.anchor = Some(AnchorBuffer {
                depth: self.path.len(),
                path: self.path.clone(),
                attrs: tag.attrs.clone(),
                text: String::new(),
                candidates: Vec::new(),
            });
        }

        for (name, value) in &tag.attrs {
            let value = value.trim();
            if value.is_empty() || !self.opts.is_interesting_attribute(name) {
                continue;
            }
            let candidate =
                LocationProperty::attribute(self.path.clone(), name.to_ascii_lowercase(), value);
            self.emit(candidate);
        }
    }

    fn text(&mut self, text: String) {
        let Some(count) = self.child_counts.last_mut() else {
            return;
        };
        let index = *count;
        *count += 1;

        if let Some(anchor) = self.anchor.as_mut() {
            if !anchor.text.is_empty() {
                anchor.text.push(' ');
            }
            anchor.text.push_str(&text);
        }
        let candidate = LocationProperty::text(self.path.clone(), index, text);
        self.emit(candidate);
    }

    fn end(&mut self) {
        let closing_anchor = self
            .anchor
            .as_ref()
            .is_some_and(|a| a.depth == self.path.len());
        if closing_anchor {
            if let Some(anchor) = self.anchor.take() {
                self.classify_anchor(anchor);
            }
        }
        self.path.pop();
        self.child_counts.pop();
    }

    fn emit(&mut self, candidate: LocationProperty) {
        match self.anchor.as_mut() {
            Some(anchor) => anchor.candidates.push(candidate),
            None => self.out.locations.push(candidate),
        }
    }

    fn classify_anchor(&mut self, anchor: AnchorBuffer) {
        let attr = |name: &str| {
            anchor
                .attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.trim().to_string())
        };
        let is_next = attr("aria-label").is_some_and(|label| NEXT_LABEL.is_match(&label))
            || anchor.text.trim().eq_ignore_ascii_case("next");
        let link = attr("href")
            .filter(|href| !href.is_empty())
            .map(|href| LocationProperty::attribute(anchor.path.clone(), "href", href));

        if is_next {
            let location = link.unwrap_or_else(|| {
                LocationProperty::text(anchor.path.clone(), 0, anchor.text.clone())
            });
            self.out.next_page.push(location);
            return;
        }

        if let Some(link) = link {
            self.out.pagination.push(link);
        }
        for candidate in anchor.candidates {
            self.out.locations.push(candidate);
        }
    }

    fn finish(mut self) -> Analysis {
        // An unclosed anchor at end of input is flushed as ordinary content.
        if let Some(anchor) = self.anchor.take() {
            self.classify_anchor(anchor);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_candidates_have_one_occurrence() {
        let analysis = analyze("<div><p>a</p><p>b</p></div>", &Options::default());
        assert_eq!(analysis.locations.len(), 2);
        for loc in &analysis.locations {
            assert_eq!(loc.count, 1);
            assert_eq!(loc.examples.len(), 1);
        }
    }

    #[test]
    fn test_twins_get_nth_child() {
        let analysis = analyze(
            r#"<div class="list"><p class="x">a</p><p class="x">b</p><p>c</p></div>"#,
            &Options::default(),
        );
        let paths: Vec<String> = analysis
            .locations
            .iter()
            .map(|l| l.path.to_string())
            .collect();
        assert_eq!(
            paths,
            vec![
                "body > div.list > p.x:nth-child(1)",
                "body > div.list > p.x:nth-child(2)",
                "body > div.list > p",
            ]
        );
    }

    #[test]
    fn test_text_index_counts_children() {
        let analysis = analyze("<p>before <b>bold</b> after</p>", &Options::default());
        let found: Vec<(String, usize, String)> = analysis
            .locations
            .iter()
            .map(|l| (l.path.to_string(), l.text_index, l.examples[0].clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("body > p".to_string(), 0, "before".to_string()),
                ("body > p > b".to_string(), 0, "bold".to_string()),
                ("body > p".to_string(), 2, "after".to_string()),
            ]
        );
    }

    #[test]
    fn test_interesting_attributes_only() {
        let analysis = analyze(
            r#"<img src="/a.png" class="pic" style="x" alt="A"><time datetime="2024-01-01">Jan</time>"#,
            &Options::default(),
        );
        let attrs: Vec<&str> = analysis
            .locations
            .iter()
            .filter_map(|l| l.attribute.as_deref())
            .collect();
        assert_eq!(attrs, vec!["src", "datetime"]);
    }

    #[test]
    fn test_next_anchor_by_aria_label() {
        let analysis = analyze(
            r#"<div><a href="/p/1">One</a><a href="/page/2" aria-label="Next">Next →</a></div>"#,
            &Options::default(),
        );
        assert_eq!(analysis.next_page.len(), 1);
        assert_eq!(analysis.next_page.as_slice()[0].examples, vec!["/page/2"]);
        assert_eq!(analysis.pagination.len(), 1);
        assert_eq!(analysis.pagination.as_slice()[0].examples, vec!["/p/1"]);
        assert!(analysis
            .locations
            .iter()
            .all(|l| l.examples[0] != "/page/2" && l.examples[0] != "Next →"));
    }

    #[test]
    fn test_next_anchor_by_exact_text() {
        let analysis = analyze(r#"<a href="?page=3"> NEXT </a>"#, &Options::default());
        assert_eq!(analysis.next_page.len(), 1);
        assert!(analysis.locations.is_empty());
    }

    #[test]
    fn test_anchors_unbuffered_without_find_next() {
        let opts = Options {
            find_next: false,
            ..Options::default()
        };
        let analysis = analyze(r#"<a href="/n" aria-label="Next">Next</a>"#, &opts);
        assert!(analysis.next_page.is_empty());
        assert!(analysis.pagination.is_empty());
        assert_eq!(analysis.locations.len(), 2);
    }

    #[test]
    fn test_detail_frames_have_no_position() {
        let html = format!(
            r#"<div class="{DETAIL_FRAME_CLASS}"><h1>A</h1></div><div class="{DETAIL_FRAME_CLASS}"><h1>B</h1></div>"#
        );
        let analysis = analyze(&html, &Options::default());
        let paths: Vec<String> = analysis.locations.iter().map(|l| l.path.to_string()).collect();
        assert_eq!(paths[0], paths[1]);
    }
}

//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate shared by the analyzer and by
//! recipe execution. Both sides must agree on what counts as a content
//! child and on positional indexes, so those rules live here only.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

use crate::patterns::WHITESPACE_NORMALIZE;

/// Tags that never hold list content and are skipped when counting children.
pub const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "br", "template", "svg", "iframe", "head",
];

// === Parsing ===

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// The document's `body` element.
#[must_use]
pub fn body(doc: &Document) -> Option<NodeRef<'_>> {
    doc.select("body").nodes().first().copied()
}

// === Tag/Node Information ===

/// Lowercase tag name of an element node.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
    node.node_name().map(|t| t.to_ascii_lowercase())
}

/// Class tokens of an element, in attribute order, without duplicates.
#[must_use]
pub fn classes(node: &NodeRef) -> Vec<String> {
    let Some(class_attr) = node.attr("class") else {
        return Vec::new();
    };
    let mut out: Vec<String> = Vec::new();
    for token in class_attr.split_whitespace() {
        if !out.iter().any(|c| c == token) {
            out.push(token.to_string());
        }
    }
    out
}

/// Whether the element is one of [`SKIPPED_TAGS`].
#[must_use]
pub fn is_skipped(node: &NodeRef) -> bool {
    tag_name(node).is_some_and(|t| SKIPPED_TAGS.contains(&t.as_str()))
}

// === Children ===

/// Element children of a node, in document order.
#[must_use]
pub fn element_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children().into_iter().filter(NodeRef::is_element).collect()
}

/// Children that count toward a text-node index: non-skipped elements and
/// non-blank text nodes.
#[must_use]
pub fn content_children<'a>(node: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    node.children()
        .into_iter()
        .filter(|child| {
            if child.is_element() {
                !is_skipped(child)
            } else if child.is_text() {
                !child.text().trim().is_empty()
            } else {
                false
            }
        })
        .collect()
}

/// 1-based position of an element among its parent's element children,
/// the index `:nth-child()` refers to.
#[must_use]
pub fn element_index(node: &NodeRef) -> usize {
    node.parent()
        .and_then(|parent| {
            element_children(&parent)
                .iter()
                .position(|sibling| sibling.id == node.id)
        })
        .map_or(1, |i| i + 1)
}

// === Text ===

/// Trim and collapse internal whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    WHITESPACE_NORMALIZE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_deduplicated_in_order() {
        let doc = parse(r#"<div class="b a  b c">x</div>"#);
        let node = doc.select("div").nodes()[0];
        assert_eq!(classes(&node), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_content_children_skip_blank_text_and_br() {
        let doc = parse("<p>\n  one <br> <b>two</b>  three <script>x</script></p>");
        let p = doc.select("p").nodes()[0];
        let children = content_children(&p);

        assert_eq!(children.len(), 3);
        assert!(children[0].is_text());
        assert_eq!(tag_name(&children[1]).as_deref(), Some("b"));
        assert_eq!(children[2].text().trim(), "three");
    }

    #[test]
    fn test_element_index_counts_elements_only() {
        let doc = parse("<ul> text <li>1</li> <li>2</li><li>3</li></ul>");
        let third = doc.select("li").nodes()[2];
        assert_eq!(element_index(&third), 3);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Hello \n\n  World  "), "Hello World");
    }
}

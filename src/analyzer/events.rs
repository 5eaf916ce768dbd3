//! Forward-only markup event stream.
//!
//! The stream is produced by walking the parsed document rather than raw
//! tokens, so the paths the analyzer derives agree with what the selector
//! engine later matches (implied `tbody`, auto-closed `p`, and so on).
//! Skipped tags are dropped together with their subtree and blank text
//! nodes are never emitted.

use std::collections::HashMap;

use crate::dom::{self, Document, NodeRef};

/// An opening tag together with the sibling facts needed for positional
/// pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercase tag name.
    pub name: String,
    /// Class tokens in source order.
    pub classes: Vec<String>,
    /// All attributes as `(name, value)` pairs.
    pub attrs: Vec<(String, String)>,
    /// 1-based index among the parent's element children.
    pub position: usize,
    /// Whether another element child of the same parent has the same tag
    /// and class set.
    pub has_twin: bool,
}

/// One event of the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// Entering an element.
    Start(StartTag),
    /// Leaving an element.
    End(String),
    /// A non-blank text node, whitespace-normalized.
    Text(String),
}

/// Produce the event stream for the document's `body`.
#[must_use]
pub fn events(doc: &Document) -> Vec<MarkupEvent> {
    let mut out = Vec::new();
    if let Some(body) = dom::body(doc) {
        walk(&body, 1, false, &mut out);
    }
    out
}

fn signature(node: &NodeRef) -> (String, Vec<String>) {
    let mut classes = dom::classes(node);
    classes.sort();
    (dom::tag_name(node).unwrap_or_default(), classes)
}

fn walk(node: &NodeRef, position: usize, has_twin: bool, out: &mut Vec<MarkupEvent>) {
    let name = dom::tag_name(node).unwrap_or_default();
    let attrs = node
        .attrs()
        .iter()
        .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
        .collect();
    out.push(MarkupEvent::Start(StartTag {
        name: name.clone(),
        classes: dom::classes(node),
        attrs,
        position,
        has_twin,
    }));

    let elements = dom::element_children(node);
    let signatures: Vec<(String, Vec<String>)> = elements.iter().map(signature).collect();
    let mut twins: HashMap<&(String, Vec<String>), usize> = HashMap::new();
    for sig in &signatures {
        *twins.entry(sig).or_default() += 1;
    }

    let mut element_position = 0;
    for child in node.children() {
        if child.is_element() {
            element_position += 1;
            if dom::is_skipped(&child) {
                continue;
            }
            let sig = &signatures[element_position - 1];
            let twin = twins.get(sig).copied().unwrap_or(0) > 1;
            walk(&child, element_position, twin, out);
        } else if child.is_text() {
            let text = dom::clean_text(&child.text());
            if !text.is_empty() {
                out.push(MarkupEvent::Text(text));
            }
        }
    }

    out.push(MarkupEvent::End(name));
}

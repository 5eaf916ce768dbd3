//! Path model: a DOM location as a sequence of tag/class/position steps.
//!
//! A [`Path`] renders to a canonical child-combinator selector such as
//! `body > div.list > div.item:nth-child(3) > span.title`. Two paths are
//! equal exactly when their rendered strings are equal.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    /// Lowercase tag name.
    pub tag: String,
    /// Class tokens, in source order.
    pub classes: Vec<String>,
    /// Positional pseudo-class `:nth-child(k)`, if assigned.
    pub nth_child: Option<usize>,
}

impl Node {
    /// Create a node without a positional pseudo-class.
    #[must_use]
    pub fn new(tag: impl Into<String>, classes: Vec<String>) -> Self {
        Self {
            tag: tag.into(),
            classes,
            nth_child: None,
        }
    }

    /// Builder-style positional pseudo-class.
    #[must_use]
    pub fn with_nth_child(mut self, k: usize) -> Self {
        self.nth_child = Some(k);
        self
    }

    /// Whether both nodes carry the same class set, ignoring order.
    #[must_use]
    pub fn same_classes(&self, other: &Node) -> bool {
        self.classes.len() == other.classes.len()
            && self.classes.iter().all(|c| other.classes.contains(c))
    }

    /// Tag, class set and position all agree.
    #[must_use]
    pub fn same_structure(&self, other: &Node) -> bool {
        self.tag == other.tag && self.same_classes(other) && self.nth_child == other.nth_child
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape_css_ident(&self.tag))?;
        for class in &self.classes {
            write!(f, ".{}", escape_css_ident(class))?;
        }
        if let Some(k) = self.nth_child {
            write!(f, ":nth-child({k})")?;
        }
        Ok(())
    }
}

/// Ordered sequence of nodes from `body` down to a target element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Node>);

impl Path {
    /// Empty path.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The nodes of the path, head first.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    /// Mutable access to the nodes; used by generalization.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.0
    }

    /// Node at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    /// Last node.
    #[must_use]
    pub fn last(&self) -> Option<&Node> {
        self.0.last()
    }

    /// Append a node.
    pub fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    /// Remove and return the last node.
    pub fn pop(&mut self) -> Option<Node> {
        self.0.pop()
    }

    /// Copy of the first `len` nodes.
    #[must_use]
    pub fn truncated(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    /// The nodes after the first `len`, as a relative path.
    #[must_use]
    pub fn suffix(&self, len: usize) -> Path {
        Path(self.0.get(len..).map(<[Node]>::to_vec).unwrap_or_default())
    }

    /// Levenshtein distance between the rendered selector strings.
    #[must_use]
    pub fn distance(&self, other: &Path) -> usize {
        strsim::levenshtein(&self.to_string(), &other.to_string())
    }
}

impl From<Vec<Node>> for Path {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Escape a class token so it is a valid CSS identifier.
///
/// ASCII alphanumerics, `-`, `_` and non-ASCII characters pass through;
/// a leading digit (or a digit after a leading `-`) becomes a hex escape;
/// every other character is backslash-escaped.
#[must_use]
pub fn escape_css_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    let chars: Vec<char> = ident.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        let leading_digit =
            c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        if leading_digit {
            out.push_str(&format!("\\{:x} ", u32::from(c)));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

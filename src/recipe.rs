//! Recipe model and execution against a parsed document.
//!
//! A [`Recipe`] is an item selector plus one location per field, relative
//! to the item. Executing it yields one [`Record`] per matched item. Records
//! are ordered maps so their JSON form is deterministic, which the
//! generator relies on when comparing previews.

use std::collections::BTreeMap;

use dom_query::Matcher;
use serde::Serialize;
use url::Url;

use crate::analyzer::{Node, Path};
use crate::dom::{self, Document, NodeRef};
use crate::error::{Error, Result};
use crate::generator::classify::FieldType;
use crate::url_utils::create_absolute_url;

/// One extracted record: field name to value.
pub type Record = BTreeMap<String, String>;

/// Where a field's value lives relative to the item element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementLocation {
    /// Child steps below the item; empty for the item element itself.
    #[serde(rename = "selector")]
    pub path: Path,
    /// Attribute holding the value; `None` means text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    /// Content child holding the text.
    pub text_index: usize,
}

/// A named, typed field of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub location: ElementLocation,
}

/// Absolute location of the "next page" link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginator {
    pub selector: Path,
    pub attribute: String,
}

impl Paginator {
    /// Resolve the next-page URL in `doc`, if the link is present.
    pub fn next_page(&self, doc: &Document, base: Option<&Url>) -> Result<Option<Url>> {
        let links = select(doc, &self.selector)?;
        let href = links
            .nodes()
            .iter()
            .find_map(|link| link.attr(&self.attribute))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(href.and_then(|href| match base {
            Some(base) => base.join(&href).ok(),
            None => Url::parse(&href).ok(),
        }))
    }
}

/// A recipe mined from the pages one of the parent's URL fields links to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailStage {
    /// Parent field holding the detail-page URL.
    pub url_field: String,
    pub recipe: Recipe,
}

/// An extraction recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    /// Rendered identifier of the search-tree node that produced the recipe.
    pub name: String,
    /// Item (root) selector.
    pub item: Path,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paginator: Option<Paginator>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail_stages: Vec<DetailStage>,
}

/// A recipe together with the records it produced on the analyzed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateRecipe {
    pub recipe: Recipe,
    pub preview: Vec<Record>,
}

impl Recipe {
    /// Execute the recipe.
    ///
    /// `url` values are resolved against `base` when one is given. Items
    /// that yield no value at all are dropped. `limit` truncates the
    /// result.
    pub fn apply(
        &self,
        doc: &Document,
        base: Option<&Url>,
        limit: Option<usize>,
    ) -> Result<Vec<Record>> {
        let items = select(doc, &self.item)?;
        let records = items
            .nodes()
            .iter()
            .map(|item| self.extract(item, base))
            .filter(|record| !record.is_empty())
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(records)
    }

    fn extract(&self, item: &NodeRef, base: Option<&Url>) -> Record {
        let mut record = Record::new();
        for field in &self.fields {
            if let Some(value) = field_value(item, field, base) {
                record.insert(field.name.clone(), value);
            }
        }
        record
    }
}

/// Count the live elements matching an absolute path.
pub fn count_matches(doc: &Document, path: &Path) -> Result<usize> {
    Ok(select(doc, path)?.length())
}

fn select<'a>(doc: &'a Document, path: &Path) -> Result<dom::Selection<'a>> {
    let selector = path.to_string();
    let matcher =
        Matcher::new(&selector).map_err(|_| Error::InvalidSelector(selector.clone()))?;
    Ok(doc.select_matcher(&matcher))
}

fn field_value(item: &NodeRef, field: &Field, base: Option<&Url>) -> Option<String> {
    let location = &field.location;
    locate(item, &location.path).into_iter().find_map(|el| {
        let value = match &location.attribute {
            Some(attr) => el.attr(attr).map(|v| v.trim().to_string()),
            None => text_at(&el, location.text_index),
        }?;
        if value.is_empty() {
            return None;
        }
        Some(match (field.field_type, base) {
            (FieldType::Url, Some(base)) => create_absolute_url(&value, base),
            _ => value,
        })
    })
}

/// Elements reached from `item` by following `path` one child step at a time.
fn locate<'a>(item: &NodeRef<'a>, path: &Path) -> Vec<NodeRef<'a>> {
    let mut current = vec![*item];
    for step in path.nodes() {
        current = current
            .iter()
            .flat_map(|el| dom::element_children(el))
            .filter(|child| step_matches(child, step))
            .collect();
        if current.is_empty() {
            break;
        }
    }
    current
}

fn step_matches(el: &NodeRef, step: &Node) -> bool {
    if dom::tag_name(el).as_deref() != Some(step.tag.as_str()) {
        return false;
    }
    let classes = dom::classes(el);
    if !step.classes.iter().all(|c| classes.contains(c)) {
        return false;
    }
    step.nth_child.is_none_or(|k| dom::element_index(el) == k)
}

fn text_at(el: &NodeRef, index: usize) -> Option<String> {
    let children = dom::content_children(el);
    let child = children.get(index)?;
    if child.is_text() {
        Some(dom::clean_text(&child.text()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(tag: &str, classes: &[&str]) -> Node {
        Node::new(tag, classes.iter().map(|s| (*s).to_string()).collect())
    }

    fn recipe() -> Recipe {
        Recipe {
            name: "page__05".to_string(),
            item: Path::from(vec![node("body", &[]), node("div", &["item"])]),
            fields: vec![
                Field {
                    name: "title".to_string(),
                    field_type: FieldType::Text,
                    location: ElementLocation {
                        path: Path::from(vec![node("span", &["title"])]),
                        attribute: None,
                        text_index: 0,
                    },
                },
                Field {
                    name: "link".to_string(),
                    field_type: FieldType::Url,
                    location: ElementLocation {
                        path: Path::from(vec![node("a", &[])]),
                        attribute: Some("href".to_string()),
                        text_index: 0,
                    },
                },
            ],
            paginator: None,
            detail_stages: Vec::new(),
        }
    }

    const PAGE: &str = r#"<html><body>
        <div class="item"><span class="title">One</span><a href="/e/1">More</a></div>
        <div class="item featured"><span class="title big">Two</span><a href="/e/2">More</a></div>
        <div class="item"><a href="/e/3">More</a></div>
        <div class="item"></div>
    </body></html>"#;

    #[test]
    fn test_apply_extracts_records_in_document_order() {
        let doc = dom::parse(PAGE);
        let records = recipe().apply(&doc, None, None).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("title").map(String::as_str), Some("One"));
        assert_eq!(records[1].get("title").map(String::as_str), Some("Two"));
        assert!(records[2].get("title").is_none());
        assert_eq!(records[2].get("link").map(String::as_str), Some("/e/3"));
    }

    #[test]
    fn test_apply_resolves_urls_against_base() {
        let doc = dom::parse(PAGE);
        let base = Url::parse("https://example.com/list").unwrap();
        let records = recipe().apply(&doc, Some(&base), Some(1)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].get("link").map(String::as_str),
            Some("https://example.com/e/1")
        );
    }

    #[test]
    fn test_text_index_selects_content_child() {
        let doc = dom::parse("<body><p>before <b>bold</b> after</p></body>");
        let mut r = recipe();
        r.item = Path::from(vec![node("body", &[]), node("p", &[])]);
        r.fields = vec![Field {
            name: "after".to_string(),
            field_type: FieldType::Text,
            location: ElementLocation {
                path: Path::new(),
                attribute: None,
                text_index: 2,
            },
        }];
        let records = r.apply(&doc, None, None).unwrap();
        assert_eq!(records[0].get("after").map(String::as_str), Some("after"));
    }

    #[test]
    fn test_positional_steps() {
        let doc = dom::parse("<body><div><p>a</p><p>b</p></div><div><p>c</p><p>d</p></div></body>");
        let mut r = recipe();
        r.item = Path::from(vec![node("body", &[]), node("div", &[])]);
        r.fields = vec![Field {
            name: "second".to_string(),
            field_type: FieldType::Text,
            location: ElementLocation {
                path: Path::from(vec![node("p", &[]).with_nth_child(2)]),
                attribute: None,
                text_index: 0,
            },
        }];
        let values: Vec<String> = r
            .apply(&doc, None, None)
            .unwrap()
            .into_iter()
            .filter_map(|mut rec| rec.remove("second"))
            .collect();
        assert_eq!(values, vec!["b", "d"]);
    }

    #[test]
    fn test_count_matches() {
        let doc = dom::parse(PAGE);
        let path = Path::from(vec![node("body", &[]), node("div", &["item"])]);
        assert_eq!(count_matches(&doc, &path).unwrap(), 4);
    }

    #[test]
    fn test_paginator_next_page() {
        let doc = dom::parse(r#"<body><nav><a href="?page=2" aria-label="Next">Next</a></nav></body>"#);
        let paginator = Paginator {
            selector: Path::from(vec![node("body", &[]), node("nav", &[]), node("a", &[])]),
            attribute: "href".to_string(),
        };
        let base = Url::parse("https://example.com/events").unwrap();
        let next = paginator.next_page(&doc, Some(&base)).unwrap();
        assert_eq!(next.map(String::from), Some("https://example.com/events?page=2".to_string()));
    }

    #[test]
    fn test_recipe_serializes_selectors_as_strings() {
        let json = serde_json::to_value(recipe()).unwrap();
        assert_eq!(json["item"], "body > div.item");
        assert_eq!(json["fields"][0]["location"]["selector"], "span.title");
        assert_eq!(json["fields"][1]["type"], "url");
        assert!(json.get("paginator").is_none());
    }
}

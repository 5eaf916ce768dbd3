//! Cluster expansion: the recursive candidate-recipe search.
//!
//! Each node of the search tree resolves a root for its locations, builds
//! and previews a tentative recipe, then splits the locations into clusters
//! one level below the root and recurses into each. Every call returns its
//! own subtree of recipes; the caller merges them.

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

use super::classify::{classify, is_detail_url, FieldType};
use super::config_id::ConfigId;
use super::root::{find_root, pullback};
use super::Recipes;
use crate::analyzer::{LocationProperty, Path};
use crate::dates::DateRecognizer;
use crate::dom::Document;
use crate::error::Result;
use crate::recipe::{CandidateRecipe, ElementLocation, Field, Paginator, Record, Recipe};
use crate::Options;

/// Everything an expansion needs besides the locations themselves.
pub struct ExpandContext<'a> {
    pub doc: &'a Document,
    pub opts: &'a Options,
    /// Base for resolving `url` field values.
    pub base: Option<&'a Url>,
    pub recognizer: &'a dyn DateRecognizer,
    /// Attached unchanged to every recipe of the tree.
    pub paginator: Option<&'a Paginator>,
}

/// Expand `locations` into the recipes of the subtree rooted at `id`.
///
/// Locations must already be squashed, filtered and named.
pub fn expand(ctx: &ExpandContext, id: ConfigId, locations: &[LocationProperty]) -> Result<Recipes> {
    expand_node(ctx, id, locations, None)
}

struct Parent<'p> {
    root: &'p Path,
    preview_json: &'p str,
}

fn expand_node(
    ctx: &ExpandContext,
    id: ConfigId,
    locations: &[LocationProperty],
    parent: Option<Parent>,
) -> Result<Recipes> {
    let mut out = Recipes::new();
    if locations.is_empty() {
        return Ok(out);
    }

    let min_len = parent.as_ref().map_or(1, |p| p.root.len() + 1);
    let expected = locations.iter().map(|l| l.count).max().unwrap_or(0);
    let structural = find_root(locations, min_len);
    let root = pullback(ctx.doc, structural, expected, min_len, &ctx.opts.pullback)?;

    let typed: Vec<(&LocationProperty, FieldType)> = locations
        .iter()
        .map(|l| (l, classify(l, ctx.recognizer, ctx.opts.date_threshold)))
        .collect();
    let recipe = build_recipe(&id, &root, &typed, ctx.paginator);
    let preview = recipe.apply(ctx.doc, ctx.base, ctx.opts.preview_limit)?;
    let preview_json = serde_json::to_string(&preview)?;

    match rejection(ctx.opts, &typed, &preview, &preview_json, parent.as_ref()) {
        None => {
            debug!(id = %id, item = %root, fields = recipe.fields.len(), records = preview.len(), "candidate recipe");
            out.insert(id.clone(), CandidateRecipe { recipe, preview });
        }
        Some(reason) => debug!(id = %id, item = %root, reason, "skipped candidate recipe"),
    }

    for (index, cluster) in clusters(locations, &root).into_iter().enumerate() {
        let parent = Parent {
            root: &root,
            preview_json: &preview_json,
        };
        out.extend(expand_node(ctx, id.child(index), &cluster, Some(parent))?);
    }
    Ok(out)
}

fn build_recipe(
    id: &ConfigId,
    root: &Path,
    typed: &[(&LocationProperty, FieldType)],
    paginator: Option<&Paginator>,
) -> Recipe {
    let mut fields: Vec<Field> = Vec::with_capacity(typed.len());
    for (location, field_type) in typed {
        if fields.iter().any(|f| f.name == location.name) {
            continue;
        }
        fields.push(Field {
            name: location.name.clone(),
            field_type: *field_type,
            location: ElementLocation {
                path: location.path.suffix(root.len()),
                attribute: location.attribute.clone(),
                text_index: location.text_index,
            },
        });
    }

    Recipe {
        name: id.to_string(),
        item: root.clone(),
        fields,
        paginator: paginator.cloned(),
        detail_stages: Vec::new(),
    }
}

/// Why a tentative recipe is not emitted, if it is not.
fn rejection(
    opts: &Options,
    typed: &[(&LocationProperty, FieldType)],
    preview: &[Record],
    preview_json: &str,
    parent: Option<&Parent>,
) -> Option<&'static str> {
    if preview.is_empty() {
        return Some("empty preview");
    }
    if opts.pruning && parent.is_some_and(|p| p.preview_json == preview_json) {
        return Some("same preview as parent");
    }
    if let Some(required) = opts.require_string.as_deref() {
        let found = preview
            .iter()
            .any(|record| record.values().any(|v| v.contains(required)));
        if !found {
            return Some("required string missing");
        }
    }
    if opts.detail_mode && !typed.iter().any(|(l, t)| is_detail_url(l, *t)) {
        return Some("no detail url field");
    }
    None
}

/// Group the locations extending past `root` by their path one level
/// deeper, ordered by similarity to the root and then lexically.
fn clusters(locations: &[LocationProperty], root: &Path) -> Vec<Vec<LocationProperty>> {
    let depth = root.len() + 1;
    let mut groups: BTreeMap<String, (Path, Vec<LocationProperty>)> = BTreeMap::new();
    for location in locations.iter().filter(|l| l.path.len() >= depth) {
        let key = location.path.truncated(depth);
        groups
            .entry(key.to_string())
            .or_insert_with(|| (key, Vec::new()))
            .1
            .push(location.clone());
    }

    let mut ordered: Vec<(usize, String, Vec<LocationProperty>)> = groups
        .into_iter()
        .map(|(rendered, (key, members))| (key.distance(root), rendered, members))
        .collect();
    ordered.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    ordered.into_iter().map(|(_, _, members)| members).collect()
}

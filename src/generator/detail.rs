//! Detail-page join.
//!
//! For a recipe with a URL field pointing at per-item pages, the linked
//! pages are fetched, framed side by side in one synthetic document and
//! mined like any other page, with the number of pages as the occurrence
//! threshold. The best recipe found there becomes a detail stage of a copy
//! of the parent recipe, and its values are joined into the parent's
//! records under `<url field>__<detail field>` keys.

use std::collections::HashMap;

use tracing::{debug, warn};
use url::Url;

use super::config_id::ConfigId;
use super::{mine_tier, page_base, Recipes};
use crate::analyzer::{analyze_document, Path, DETAIL_FRAME_CLASS};
use crate::dom::{self, Document};
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::generator::classify::FieldType;
use crate::patterns::IMAGE_EXTENSION;
use crate::recipe::{CandidateRecipe, DetailStage, Field, Record, Recipe};
use crate::selection::SelectAll;
use crate::url_utils::{normalize_url, resolve_detail_url};
use crate::Options;

/// Mine and join detail pages for every detail-URL field of `candidate`.
///
/// Fields that fail outright are logged and skipped. Only an invalid page
/// URL in `opts` is returned as an error.
pub fn join_details(
    candidate: &CandidateRecipe,
    id: &ConfigId,
    opts: &Options,
    fetcher: &dyn Fetcher,
) -> Result<Recipes> {
    let base = page_base(opts)?;
    let mut out = Recipes::new();

    for field in &candidate.recipe.fields {
        if !is_detail_field(field, &candidate.preview) {
            continue;
        }
        match join_field(candidate, id, field, opts, base.as_ref(), fetcher) {
            Ok(Some((detail_id, joined))) => {
                out.insert(detail_id, joined);
            }
            Ok(None) => {}
            Err(err) => warn!(field = %field.name, error = %err, "detail field failed, skipping"),
        }
    }
    Ok(out)
}

/// A fetched detail page.
struct DetailPage {
    url: Url,
    doc: Document,
}

fn is_detail_field(field: &Field, preview: &[Record]) -> bool {
    if field.field_type != FieldType::Url || field.location.attribute.as_deref() != Some("href") {
        return false;
    }
    let mut values = preview.iter().filter_map(|r| r.get(&field.name)).peekable();
    values.peek().is_some() && values.all(|v| !IMAGE_EXTENSION.is_match(v))
}

/// Distinct detail URLs of `field`, in record order.
fn detail_urls(field: &Field, preview: &[Record], base: Option<&Url>) -> Vec<Url> {
    let mut urls: Vec<Url> = Vec::new();
    for value in preview.iter().filter_map(|r| r.get(&field.name)) {
        let Some(url) = resolve_detail_url(value, base) else {
            continue;
        };
        let url = normalize_url(&url);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

fn join_field(
    candidate: &CandidateRecipe,
    id: &ConfigId,
    field: &Field,
    opts: &Options,
    base: Option<&Url>,
    fetcher: &dyn Fetcher,
) -> Result<Option<(ConfigId, CandidateRecipe)>> {
    let urls = detail_urls(field, &candidate.preview, base);

    let mut pages: Vec<DetailPage> = Vec::new();
    for url in urls.iter().take(opts.max_detail_pages) {
        match fetcher.fetch(url) {
            Ok(html) => pages.push(DetailPage {
                url: url.clone(),
                doc: dom::parse(&html),
            }),
            Err(err @ Error::Offline(_)) => return Err(err),
            Err(err) => warn!(%url, error = %err, "detail page fetch failed, skipping page"),
        }
    }
    if pages.len() < 2 {
        warn!(field = %field.name, pages = pages.len(), "not enough detail pages to mine");
        return Ok(None);
    }

    let Some((detail_id, detail_recipe)) = mine_detail_recipe(&pages, id, field, opts)? else {
        warn!(field = %field.name, "no recipe found on detail pages");
        return Ok(None);
    };

    let records = join_records(candidate, field, &detail_recipe, base, pages, fetcher);
    let mut recipe = candidate.recipe.clone();
    recipe.name = detail_id.to_string();
    recipe.detail_stages.push(DetailStage {
        url_field: field.name.clone(),
        recipe: detail_recipe,
    });

    Ok(Some((
        detail_id,
        CandidateRecipe {
            recipe,
            preview: records,
        },
    )))
}

/// Mine the shared recipe of `pages` and return the top one, unframed.
fn mine_detail_recipe(
    pages: &[DetailPage],
    id: &ConfigId,
    field: &Field,
    opts: &Options,
) -> Result<Option<(ConfigId, Recipe)>> {
    let synthetic = dom::parse(&synthetic_document(pages));
    let min_occ = pages.len();
    let detail_opts = Options {
        min_occurrences: vec![min_occ],
        require_string: None,
        detail_mode: false,
        url: None,
        ..opts.clone()
    };

    let analysis = analyze_document(&synthetic, &detail_opts);
    let root_id = id.detail(&field.name, min_occ);
    let tier = mine_tier(&synthetic, &analysis, &detail_opts, None, min_occ, &mut SelectAll, root_id)?;
    debug!(field = %field.name, pages = min_occ, recipes = tier.recipes.len(), "mined detail pages");

    Ok(tier.recipes.into_iter().next().map(|(detail_id, top)| {
        let mut recipe = top.recipe;
        recipe.item = strip_frame(&recipe.item);
        recipe.paginator = None;
        recipe.name = detail_id.to_string();
        (detail_id, recipe)
    }))
}

/// Every page's body, each wrapped in a detail frame.
fn synthetic_document(pages: &[DetailPage]) -> String {
    let mut html = String::from("<html><body>");
    for page in pages {
        let body = page.doc.select("body").inner_html();
        html.push_str(&format!(r#"<div class="{DETAIL_FRAME_CLASS}">{body}</div>"#));
    }
    html.push_str("</body></html>");
    html
}

/// Replace a leading `body > div.<frame>` with `body`.
fn strip_frame(item: &Path) -> Path {
    let nodes = item.nodes();
    let framed = nodes.first().is_some_and(|n| n.tag == "body")
        && nodes
            .get(1)
            .is_some_and(|n| n.classes.iter().any(|c| c == DETAIL_FRAME_CLASS));
    if !framed {
        return item.clone();
    }
    let mut stripped = item.truncated(1);
    for node in &nodes[2..] {
        stripped.push(node.clone());
    }
    stripped
}

/// Extend each parent record with the values of its own detail page.
///
/// Records whose page cannot be fetched or does not yield exactly one
/// detail record are dropped.
fn join_records(
    candidate: &CandidateRecipe,
    field: &Field,
    detail: &Recipe,
    base: Option<&Url>,
    pages: Vec<DetailPage>,
    fetcher: &dyn Fetcher,
) -> Vec<Record> {
    let mut docs: HashMap<Url, Document> = pages.into_iter().map(|p| (p.url, p.doc)).collect();
    let mut joined = Vec::with_capacity(candidate.preview.len());

    for record in &candidate.preview {
        let Some(url) = record
            .get(&field.name)
            .and_then(|v| resolve_detail_url(v, base))
            .map(|u| normalize_url(&u))
        else {
            continue;
        };

        if !docs.contains_key(&url) {
            match fetcher.fetch(&url) {
                Ok(html) => {
                    docs.insert(url.clone(), dom::parse(&html));
                }
                Err(err) => {
                    warn!(%url, error = %err, "detail page fetch failed, skipping record");
                    continue;
                }
            }
        }
        let Some(doc) = docs.get(&url) else {
            continue;
        };

        let detail_records = match detail.apply(doc, Some(&url), None) {
            Ok(records) => records,
            Err(err) => {
                warn!(%url, error = %err, "detail recipe failed, skipping record");
                continue;
            }
        };
        let [detail_record] = detail_records.as_slice() else {
            warn!(%url, records = detail_records.len(), "detail page did not yield exactly one record, skipping");
            continue;
        };

        let mut merged = record.clone();
        for (name, value) in detail_record {
            merged.insert(format!("{}__{name}", field.name), value.clone());
        }
        joined.push(merged);
    }
    joined
}

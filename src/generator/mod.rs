//! Recipe generation.
//!
//! # Module Structure
//!
//! - `classify`: field naming and typing
//! - `config_id`: hierarchical recipe identifiers
//! - `root`: item selector resolution and pullback
//! - `expand`: recursive cluster expansion
//! - `detail`: detail-page join
//!
//! A generation pass ("tier") runs the analyzer output through squashing
//! and filtering for one occurrence threshold, names and selects fields,
//! then expands the survivors into a tree of candidate recipes.

pub mod classify;
pub mod config_id;
pub mod detail;
pub mod expand;
pub mod root;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::analyzer::{analyze_document, squash::squash, Analysis, LocationManager, Path};
use crate::dates::PatternDateRecognizer;
use crate::dom::{self, Document};
use crate::error::{Error, Result};
use crate::fetch::{CachedFetcher, Fetcher};
use crate::recipe::{CandidateRecipe, Paginator};
use crate::selection::{apply_selection, FieldSelector, SelectAll};
use crate::url_utils::{page_slug, parse_url};
use crate::Options;

use classify::Namer;
use config_id::ConfigId;
use expand::{expand, ExpandContext};

/// Distinct example hrefs kept per pagination candidate.
const PAGINATION_EXAMPLES: usize = 5;

/// Candidate recipes keyed by identifier.
pub type Recipes = BTreeMap<ConfigId, CandidateRecipe>;

/// A repeated link that is not a "next" link, typically page numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationCandidate {
    pub selector: Path,
    pub count: usize,
    pub examples: Vec<String>,
}

/// Result of a multi-tier discovery run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Discovery {
    pub recipes: Recipes,
    pub pagination: Vec<PaginationCandidate>,
}

/// Output of one tier before it is merged into a [`Discovery`].
pub(crate) struct Tier {
    pub recipes: Recipes,
    pub pagination: LocationManager,
}

/// Run one generation pass for `min_occ` over `html`.
///
/// Returns an empty map when nothing repeats often enough or no field is
/// selected.
pub fn generate_tier(
    html: &str,
    opts: &Options,
    min_occ: usize,
    selector: &mut dyn FieldSelector,
) -> Result<Recipes> {
    let doc = dom::parse(html);
    let base = page_base(opts)?;
    let analysis = analyze_document(&doc, opts);
    let id = ConfigId::tier(page_slug(opts.url.as_deref()), min_occ);
    Ok(mine_tier(&doc, &analysis, opts, base.as_ref(), min_occ, selector, id)?.recipes)
}

/// Run every tier of `opts.min_occurrences` over `html`.
///
/// A failing tier is logged and skipped; the other tiers still run.
pub fn discover(html: &str, opts: &Options) -> Result<Discovery> {
    let doc = dom::parse(html);
    let base = page_base(opts)?;
    let analysis = analyze_document(&doc, opts);
    let slug = page_slug(opts.url.as_deref());

    let mut discovery = Discovery::default();
    let mut links = LocationManager::new();
    for &min_occ in &opts.min_occurrences {
        let id = ConfigId::tier(slug.clone(), min_occ);
        match mine_tier(&doc, &analysis, opts, base.as_ref(), min_occ, &mut SelectAll, id) {
            Ok(tier) => {
                discovery.recipes.extend(tier.recipes);
                links.merge(tier.pagination);
            }
            Err(err) => warn!(min_occ, error = %err, "tier failed, skipping"),
        }
    }
    discovery.pagination = pagination_candidates(links);

    info!(recipes = discovery.recipes.len(), "discovery complete");
    Ok(discovery)
}

/// Discover recipes in detail mode and extend each one with a recipe mined
/// from the pages its URL fields link to.
///
/// Fetched pages are memoized for the duration of the call.
pub fn discover_with_details(html: &str, opts: &Options, fetcher: &dyn Fetcher) -> Result<Discovery> {
    let opts = Options {
        detail_mode: true,
        ..opts.clone()
    };
    let mut discovery = discover(html, &opts)?;
    let memo = CachedFetcher::in_memory(fetcher);

    let mut joined = Recipes::new();
    for (id, candidate) in &discovery.recipes {
        match detail::join_details(candidate, id, &opts, &memo) {
            Ok(recipes) => joined.extend(recipes),
            Err(err) => warn!(id = %id, error = %err, "detail join failed, skipping recipe"),
        }
    }
    discovery.recipes.extend(joined);

    info!(recipes = discovery.recipes.len(), "detail discovery complete");
    Ok(discovery)
}

/// Parsed `opts.url`, if any.
pub(crate) fn page_base(opts: &Options) -> Result<Option<Url>> {
    match opts.url.as_deref() {
        None => Ok(None),
        Some(raw) => parse_url(raw)
            .map(Some)
            .ok_or_else(|| Error::InvalidUrl(raw.to_string())),
    }
}

/// Squash, filter, name, select and expand the locations of one tier.
pub(crate) fn mine_tier(
    doc: &Document,
    analysis: &Analysis,
    opts: &Options,
    base: Option<&Url>,
    min_occ: usize,
    selector: &mut dyn FieldSelector,
    id: ConfigId,
) -> Result<Tier> {
    let mut locations = squash(analysis.locations.clone(), min_occ).filter_below_min_count(min_occ);
    if opts.only_varying_fields {
        locations = locations.filter_static();
    }
    Namer::new().name_all(&mut locations)?;
    let locations = apply_selection(locations, selector);

    let pagination = squash(analysis.pagination.clone(), min_occ).filter_below_min_count(min_occ);
    if locations.is_empty() {
        warn!(min_occ, id = %id, "no candidate fields for tier");
        return Ok(Tier {
            recipes: Recipes::new(),
            pagination,
        });
    }

    let paginator = find_paginator(&analysis.next_page, min_occ);
    let ctx = ExpandContext {
        doc,
        opts,
        base,
        recognizer: &PatternDateRecognizer,
        paginator: paginator.as_ref(),
    };
    let recipes = expand(&ctx, id, locations.as_slice())?;
    debug!(min_occ, fields = locations.len(), recipes = recipes.len(), "tier expanded");

    Ok(Tier { recipes, pagination })
}

/// One candidate per selector across tiers, keeping the highest count.
fn pagination_candidates(links: LocationManager) -> Vec<PaginationCandidate> {
    let mut best: BTreeMap<String, PaginationCandidate> = BTreeMap::new();
    for link in &links {
        let selector = link.path.to_string();
        if best.get(&selector).is_some_and(|p| p.count >= link.count) {
            continue;
        }
        let candidate = PaginationCandidate {
            selector: link.path.clone(),
            count: link.count,
            examples: link
                .representative_examples(PAGINATION_EXAMPLES)
                .into_iter()
                .map(str::to_string)
                .collect(),
        };
        best.insert(selector, candidate);
    }
    best.into_values().collect()
}

/// The most frequent next-page link, first in document order on ties.
fn find_paginator(next_page: &LocationManager, min_occ: usize) -> Option<Paginator> {
    let squashed = squash(next_page.clone(), min_occ);
    let mut best: Option<&crate::analyzer::LocationProperty> = None;
    for link in squashed.iter().filter(|l| l.attribute_name() == "href") {
        if best.is_none_or(|b| link.count > b.count) {
            best = Some(link);
        }
    }
    best.map(|link| Paginator {
        selector: link.path.clone(),
        attribute: "href".to_string(),
    })
}

//! # rs-recipe-miner
//!
//! Unsupervised wrapper induction for list pages.
//!
//! Given the markup of a page that shows a repeated list (events, products,
//! search results), this library discovers extraction recipes: an item
//! selector for the repeating container plus named, typed field locations
//! relative to it. No examples are labeled by hand; repetition is the only
//! signal.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_recipe_miner::{discover, Options};
//!
//! let items: String = (1..=5)
//!     .map(|i| format!(r#"<div class="item"><span class="title">Event {i}</span><a href="/e/{i}">More</a></div>"#))
//!     .collect();
//! let html = format!("<html><body>{items}</body></html>");
//!
//! let options = Options {
//!     min_occurrences: vec![5],
//!     only_varying_fields: true,
//!     ..Options::default()
//! };
//! let discovery = discover(&html, &options)?;
//! let (id, top) = discovery.recipes.iter().next().unwrap();
//! assert_eq!(id.to_string(), "page__05");
//! assert_eq!(top.recipe.item.to_string(), "body > div.item");
//! assert_eq!(top.preview.len(), 5);
//! # Ok::<(), rs_recipe_miner::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! - **Analyzer**: one pass over the document records every text node and
//!   interesting attribute as a candidate location
//! - **Squashing**: per-occurrence candidates merge into repeat-aware locations
//! - **Root resolution**: the common path prefix, adjusted against live match counts
//! - **Cluster expansion**: recursive search for nested lists, with pruning
//! - **Detail join**: optional second recipe mined from linked item pages

mod error;
mod options;
mod patterns;

/// DOM operations adapter over `dom_query`.
pub mod dom;

/// Markup analysis, candidate locations and squashing.
pub mod analyzer;

/// Recipe generation: naming, roots, expansion and detail joins.
pub mod generator;

/// Recipe model and execution.
pub mod recipe;

/// Date/time recognition for field typing.
pub mod dates;

/// Page fetching with in-memory and on-disk caching.
pub mod fetch;

/// Field selection capability.
pub mod selection;

/// URL utilities for resolution, normalization and slugs.
pub mod url_utils;

/// Character encoding detection and transcoding.
pub mod encoding;

// Public API - re-exports
pub use analyzer::{analyze, squash::squash, Analysis, LocationManager, LocationProperty, Node, Path};
pub use error::{Error, Result};
pub use fetch::{CachedFetcher, FetchOptions, Fetcher, HttpFetcher};
pub use generator::classify::FieldType;
pub use generator::config_id::ConfigId;
pub use generator::detail::join_details;
pub use generator::root::{find_root, pullback};
pub use generator::{discover_with_details, generate_tier, Discovery, Recipes};
pub use options::{Options, PullbackOptions};
pub use recipe::{CandidateRecipe, Recipe, Record};
pub use selection::{FieldSelector, SelectAll};

/// Discovers recipes on a page for every configured occurrence tier.
///
/// # Arguments
///
/// * `html` - The page markup
/// * `options` - Tiers, filters and heuristics; see [`Options`]
///
/// # Returns
///
/// Returns the candidate recipes of all tiers that succeeded, keyed by
/// [`ConfigId`]. Tiers that find nothing contribute nothing. Returns an
/// `Error` only when `options.url` is set but invalid.
#[allow(clippy::missing_errors_doc)]
pub fn discover(html: &str, options: &Options) -> Result<Discovery> {
    generator::discover(html, options)
}

/// Discovers recipes on a page given as raw bytes.
///
/// The encoding is taken from the page's meta declaration and defaults to
/// UTF-8; invalid sequences become U+FFFD.
///
/// # Example
///
/// ```rust
/// use rs_recipe_miner::{discover_bytes, Options};
///
/// let html = b"<html><head><meta charset=\"ISO-8859-1\"></head><body><p>Caf\xE9</p></body></html>";
/// let discovery = discover_bytes(html, &Options::default())?;
/// assert!(discovery.recipes.is_empty());
/// # Ok::<(), rs_recipe_miner::Error>(())
/// ```
#[allow(clippy::missing_errors_doc)]
pub fn discover_bytes(html: &[u8], options: &Options) -> Result<Discovery> {
    let html = encoding::decode_page(html, None);
    discover(&html, options)
}

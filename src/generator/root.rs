//! Root (item) selector resolution.
//!
//! The structural root is the longest common path prefix of a cluster's
//! locations. Pullback then checks shallower ancestors against the live
//! document and keeps moving up while the match count stays consistent
//! with the expected number of records.

use tracing::debug;

use crate::analyzer::{LocationProperty, Path};
use crate::dom::Document;
use crate::error::Result;
use crate::options::PullbackOptions;
use crate::recipe::count_matches;

/// Structural root of `locations`, never shorter than `min_len` nodes.
///
/// This is the longest prefix shared by every location's path. When all
/// locations sit on the same element (in particular a single location) the
/// root is that element's parent, so the element itself stays a field.
#[must_use]
pub fn find_root(locations: &[LocationProperty], min_len: usize) -> Path {
    let Some((first, rest)) = locations.split_first() else {
        return Path::new();
    };

    let mut len = first.path.len();
    for location in rest {
        len = common_prefix_len(&first.path, &location.path, len);
    }

    let all_on_one_element = locations.iter().all(|l| l.path.len() == len);
    if all_on_one_element {
        len = len.saturating_sub(1);
    }
    first.path.truncated(len.max(min_len))
}

fn common_prefix_len(a: &Path, b: &Path, limit: usize) -> usize {
    a.nodes()
        .iter()
        .zip(b.nodes())
        .take(limit)
        .take_while(|(x, y)| x.same_structure(y))
        .count()
}

/// Move `root` up toward the document head while the live match count
/// agrees with `expected`.
///
/// An ancestor is accepted when it matches exactly `expected` elements, or
/// a multiple `k * expected` with `k < max_ratio` when it ends in the
/// preferred tag. The first rejected ancestor stops the walk. The result is
/// never shorter than `min_len`.
pub fn pullback(
    doc: &Document,
    root: Path,
    expected: usize,
    min_len: usize,
    opts: &PullbackOptions,
) -> Result<Path> {
    if !opts.enabled || expected == 0 {
        return Ok(root);
    }

    let mut best = root;
    while best.len() > min_len {
        let candidate = best.truncated(best.len() - 1);
        let count = count_matches(doc, &candidate)?;
        if !accepts(&candidate, count, expected, opts) {
            break;
        }
        debug!(from = %best, to = %candidate, count, expected, "pulled back root");
        best = candidate;
    }
    Ok(best)
}

fn accepts(candidate: &Path, count: usize, expected: usize, opts: &PullbackOptions) -> bool {
    if count == expected {
        return true;
    }
    let ends_in_preferred = candidate
        .last()
        .is_some_and(|node| node.tag == opts.preferred_tag);
    ends_in_preferred
        && count > expected
        && count % expected == 0
        && count / expected < opts.max_ratio
}

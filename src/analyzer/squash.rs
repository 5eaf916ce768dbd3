//! Squashing: merging per-occurrence candidate locations into one
//! generalized, repeat-aware location per field.
//!
//! Candidates are processed in reverse discovery order. Each one is merged
//! into the first compatible representative kept so far, or becomes a new
//! representative after its generalization pivot is chosen.
//!
//! Positional pseudo-classes are compared through their *generalized* form
//! relative to the representative's pivot `P`:
//!
//! - shallower than `P`: compared as-is, so repeated containers above the
//!   list stay distinct;
//! - at `P`: ignored, this is the list level whose siblings merge;
//! - deeper than `P`: erased when the index is at least `min_occ` (a nested
//!   list), compared as-is otherwise (distinct fields inside one item).

use tracing::debug;

use super::location::{LocationManager, LocationProperty};
use super::path::Node;

/// Generalize `locations` for an occurrence threshold of `min_occ`.
///
/// Squashing an already squashed collection with the same `min_occ` is a
/// no-op.
#[must_use]
pub fn squash(locations: LocationManager, min_occ: usize) -> LocationManager {
    let input_len = locations.len();
    let mut kept: Vec<LocationProperty> = Vec::new();

    'candidates: for candidate in locations.into_vec().into_iter().rev() {
        for rep in &mut kept {
            if can_merge(rep, &candidate, min_occ) {
                merge_into(rep, candidate);
                continue 'candidates;
            }
        }
        let mut rep = candidate;
        strip_nth_child(&mut rep, min_occ);
        kept.push(rep);
    }

    kept.reverse();
    debug!(input = input_len, output = kept.len(), min_occ, "squashed locations");
    LocationManager::from(kept)
}

/// Choose the generalization pivot of a new representative.
///
/// Scans from the tail toward the head, stopping one node short of the head
/// (`body`) when `min_occ < 6` and two nodes short otherwise. The deepest
/// positional pseudo-class with index `>= min_occ` is stripped and its
/// position becomes the pivot. Locations that already have a pivot are left
/// untouched.
pub fn strip_nth_child(location: &mut LocationProperty, min_occ: usize) {
    if location.pivot.is_some() {
        return;
    }
    let stop = if min_occ < 6 { 1 } else { 2 };
    let len = location.path.len();
    if len <= stop {
        return;
    }

    for i in (stop..len).rev() {
        let node = &mut location.path.nodes_mut()[i];
        if node.nth_child.is_some_and(|k| k >= min_occ) {
            node.nth_child = None;
            location.pivot = Some(i);
            return;
        }
    }
}

/// Positional pseudo-class of `node` at `index` as seen by a representative
/// with the given pivot.
fn generalized(node: &Node, index: usize, pivot: Option<usize>, min_occ: usize) -> Option<usize> {
    match pivot {
        Some(p) if index == p => None,
        Some(p) if index > p => node.nth_child.filter(|&k| k < min_occ),
        _ => node.nth_child,
    }
}

/// Whether `candidate` may be merged into `rep`.
#[must_use]
pub fn can_merge(rep: &LocationProperty, candidate: &LocationProperty, min_occ: usize) -> bool {
    if rep.text_index != candidate.text_index
        || rep.attribute != candidate.attribute
        || rep.path.len() != candidate.path.len()
    {
        return false;
    }
    // Only relevant when re-squashing: both sides were generalized already.
    if candidate.pivot.is_some() && candidate.pivot != rep.pivot {
        return false;
    }

    rep.path
        .nodes()
        .iter()
        .zip(candidate.path.nodes())
        .enumerate()
        .all(|(i, (a, b))| {
            a.tag == b.tag
                && generalized(a, i, rep.pivot, min_occ) == generalized(b, i, rep.pivot, min_occ)
                && classes_compatible(a, b)
        })
}

fn classes_compatible(a: &Node, b: &Node) -> bool {
    if a.classes.is_empty() && b.classes.is_empty() {
        return true;
    }
    a.classes.iter().any(|c| b.classes.contains(c))
}

/// Fold `candidate` into `rep`: intersect class sets, add occurrences, and
/// prepend the candidate's examples so they stay in document order.
fn merge_into(rep: &mut LocationProperty, candidate: LocationProperty) {
    for (a, b) in rep.path.nodes_mut().iter_mut().zip(candidate.path.nodes()) {
        a.classes.retain(|c| b.classes.contains(c));
    }
    rep.count += candidate.count;
    let later = std::mem::replace(&mut rep.examples, candidate.examples);
    rep.examples.extend(later);
}

//! Field selection.
//!
//! Between squashing and expansion the surviving candidate fields can be
//! narrowed down, interactively or by a rule. Batch discovery keeps
//! everything through [`SelectAll`].

use crate::analyzer::LocationManager;

/// Capability: choose which candidate fields go into the recipes.
pub trait FieldSelector {
    /// One flag per candidate, in order. Missing flags count as `false`.
    fn select_fields(&mut self, candidates: &LocationManager) -> Vec<bool>;
}

/// Headless selector keeping every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl FieldSelector for SelectAll {
    fn select_fields(&mut self, candidates: &LocationManager) -> Vec<bool> {
        vec![true; candidates.len()]
    }
}

impl<F> FieldSelector for F
where
    F: FnMut(&LocationManager) -> Vec<bool>,
{
    fn select_fields(&mut self, candidates: &LocationManager) -> Vec<bool> {
        self(candidates)
    }
}

/// Apply a selector's choices to `candidates`, keeping the selected ones.
#[must_use]
pub fn apply_selection(
    mut candidates: LocationManager,
    selector: &mut dyn FieldSelector,
) -> LocationManager {
    let choices = selector.select_fields(&candidates);
    for (i, location) in candidates.iter_mut().enumerate() {
        location.selected = choices.get(i).copied().unwrap_or(false);
    }
    candidates.selected()
}

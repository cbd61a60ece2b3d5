//! # Effective Constraint & Price Resolution
//!
//! A group's selection bounds and an option's price can both depend on
//! what was picked in an *earlier* group. This module resolves the
//! actual ("effective") values for the current selection state.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Effective Constraint / Price Resolution                    │
//! │                                                                         │
//! │  group.depends_on / option.price_matrix                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  parent_selected_names(parent group, selections)                       │
//! │       │                                                                 │
//! │       ├── parent has no selection ──► static bounds / base price       │
//! │       │                                                                 │
//! │       ├── no name matches a rule ───► static bounds / base price       │
//! │       │                                                                 │
//! │       └── one or more names match ──► most permissive bounds /         │
//! │                                       highest matched price            │
//! │                                                                         │
//! │  Nothing is cached: every read recomputes from current state, so      │
//! │  changing a parent is instantly visible downstream.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tie-break Policy
//! When a multi-choice parent has several selections each unlocking
//! different child bounds, the child allows the union of what is
//! permitted: both accumulators take the max of every matched rule
//! (starting at min 0 / max 1). Prices use the same policy (the highest
//! matched override) so conflicting overrides never under-price.

use crate::catalog::{GroupOption, OptionGroup, Product, SelectionBounds};
use crate::money::Money;
use crate::selection::{SelectionValue, Selections};

// =============================================================================
// Effective Constraints
// =============================================================================

/// Resolves the actual min/max selection bounds for a group under the
/// current selections.
///
/// ## Behavior
/// - No dependency, or the parent group has no selection: the group's
///   static bounds, unchanged.
/// - Otherwise, every selected parent option name with a matching rule
///   contributes; the accumulated bounds start at `min 0 / max 1` and
///   take the max per matched rule.
/// - No parent name matched any rule: static bounds again.
///
/// ## Example
/// ```rust,ignore
/// // "Sauce" {0,1} depends on "Size" with rule { "Large": {1,1} }:
/// // Small selected → {0,1} (fallback), Large selected → {1,1}.
/// let bounds = effective_constraints(&product, sauce, &selections);
/// ```
pub fn effective_constraints(
    product: &Product,
    group: &OptionGroup,
    selections: &Selections,
) -> SelectionBounds {
    let Some(dependency) = &group.depends_on else {
        return group.static_bounds();
    };

    let parent_names = parent_selected_names(product, dependency.parent_group_index, selections);
    if parent_names.is_empty() {
        return group.static_bounds();
    }

    let mut min = 0u32;
    let mut max = 1u32;
    let mut matched = false;
    for name in &parent_names {
        if let Some(rule) = dependency.rules.get(name.as_str()) {
            matched = true;
            min = min.max(rule.min_selections);
            max = max.max(rule.max_selections);
        }
    }

    if matched {
        SelectionBounds::new(min, max)
    } else {
        group.static_bounds()
    }
}

// =============================================================================
// Effective Price
// =============================================================================

/// Resolves the actual incremental price of an option under the current
/// selections.
///
/// ## Behavior
/// - No price matrix: the option's base price (0 if unset).
/// - Parent has no selection, or no selected name matches a matrix key:
///   the base price.
/// - One or more matches: the highest matched override.
pub fn effective_price(product: &Product, option: &GroupOption, selections: &Selections) -> Money {
    let Some(matrix) = &option.price_matrix else {
        return option.price();
    };

    let parent_names = parent_selected_names(product, matrix.parent_group_index, selections);

    let mut best: Option<i64> = None;
    for name in &parent_names {
        if let Some(&price) = matrix.prices.get(name.as_str()) {
            best = Some(best.map_or(price, |b| b.max(price)));
        }
    }

    best.map(Money::from_cents).unwrap_or_else(|| option.price())
}

// =============================================================================
// Parent Name Resolution
// =============================================================================

/// The display names of the options currently selected in the group at
/// `parent_index`.
///
/// - single-choice: the one selected option's name, or none
/// - multi-choice: the names of all selected options
/// - quantity-choice: the names of all options with quantity above zero
///
/// Stale option ids (no longer on the group) and an out-of-range parent
/// index both resolve to no names, which callers treat as "no parent
/// selection".
pub fn parent_selected_names(
    product: &Product,
    parent_index: usize,
    selections: &Selections,
) -> Vec<String> {
    let Some(parent) = product.groups.get(parent_index) else {
        return Vec::new();
    };
    let Some(value) = selections.selection(&parent.id) else {
        return Vec::new();
    };

    let ids: Vec<&str> = match value {
        SelectionValue::Single(selected) => selected.iter().map(String::as_str).collect(),
        SelectionValue::Multi(selected) => selected.iter().map(String::as_str).collect(),
        SelectionValue::Quantity(quantities) => quantities
            .iter()
            .filter(|(_, &quantity)| quantity > 0)
            .map(|(id, _)| id.as_str())
            .collect(),
    };

    ids.into_iter()
        .filter_map(|id| parent.option(id))
        .map(|option| option.name.clone())
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Selection State
//!
//! Tracks what a customer has picked in each group during one
//! customization session, and applies the UI-triggered transitions.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Selection Transitions                                │
//! │                                                                         │
//! │  UI Event                 Group Type          State Change              │
//! │  ────────                 ──────────          ────────────              │
//! │  select(option)           single-choice       replace current selection │
//! │  toggle(option)           multi-choice        add (if below max) /      │
//! │                                               remove                    │
//! │  increment(option)        quantity-choice     +1 (if total below max)   │
//! │  decrement(option)        quantity-choice     -1 (floors at 0)          │
//! │                                                                         │
//! │  Over-limit adds are SILENT no-ops: the UI disables the control        │
//! │  proactively, the state machine rejects as a safety net.               │
//! │  Dependent groups are never recomputed eagerly: effective bounds       │
//! │  and prices are resolved on every read.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A `Selections` value is owned by exactly one customization session.
//! It is created fresh (or seeded from a stored customization in edit
//! mode) and discarded on confirm or cancel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{GroupOption, GroupType, OptionGroup, Product};
use crate::error::{CoreError, CoreResult};
use crate::rules;

// =============================================================================
// Selection Value
// =============================================================================

/// The selection state of one group.
///
/// ## Why a Sum Type?
/// The stored shape depends on the group type (a scalar, a set, or a
/// quantity map). Modeling it as an enum lets the compiler enforce
/// exhaustive handling in the resolvers, validator and hasher instead of
/// runtime shape inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum SelectionValue {
    /// Single-choice: the selected option id, if any.
    Single(Option<String>),
    /// Multi-choice: selected option ids in insertion order.
    /// Insertion order is irrelevant for semantics; the hasher sorts.
    Multi(Vec<String>),
    /// Quantity-choice: option id → quantity. Entries are kept only while
    /// quantity is above zero.
    Quantity(BTreeMap<String, u32>),
}

impl SelectionValue {
    /// The empty selection for a group type.
    pub fn default_for(group_type: GroupType) -> Self {
        match group_type {
            GroupType::SingleChoice => SelectionValue::Single(None),
            GroupType::MultiChoice => SelectionValue::Multi(Vec::new()),
            GroupType::QuantityChoice => SelectionValue::Quantity(BTreeMap::new()),
        }
    }

    /// Whether this value has the shape the group type expects.
    pub fn matches(&self, group_type: GroupType) -> bool {
        matches!(
            (self, group_type),
            (SelectionValue::Single(_), GroupType::SingleChoice)
                | (SelectionValue::Multi(_), GroupType::MultiChoice)
                | (SelectionValue::Quantity(_), GroupType::QuantityChoice)
        )
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        match self {
            SelectionValue::Single(selected) => selected.is_none(),
            SelectionValue::Multi(selected) => selected.is_empty(),
            SelectionValue::Quantity(quantities) => quantities.values().all(|&q| q == 0),
        }
    }
}

// =============================================================================
// Selections
// =============================================================================

/// Per-group selection state for one customization session, keyed by
/// group id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections {
    values: BTreeMap<String, SelectionValue>,
}

impl Selections {
    /// Creates the empty selection state for a product: every group
    /// starts at its type's empty default.
    pub fn empty_for(product: &Product) -> Self {
        let values = product
            .groups
            .iter()
            .map(|g| (g.id.clone(), SelectionValue::default_for(g.group_type)))
            .collect();
        Selections { values }
    }

    /// Returns the selection state of a group, if tracked.
    pub fn selection(&self, group_id: &str) -> Option<&SelectionValue> {
        self.values.get(group_id)
    }

    /// Iterates over `(group_id, value)` pairs in group-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SelectionValue)> {
        self.values.iter()
    }

    /// Coerces this state to the product's current shape.
    ///
    /// UI-originated state must never crash pricing or validation, so:
    /// - entries for unknown group ids are dropped,
    /// - a value whose shape mismatches its group's type is reset to the
    ///   type's empty default,
    /// - groups with no entry are initialized to their empty default.
    pub fn conform(&mut self, product: &Product) {
        self.values
            .retain(|group_id, _| product.group(group_id).is_some());
        for group in &product.groups {
            let value = self
                .values
                .entry(group.id.clone())
                .or_insert_with(|| SelectionValue::default_for(group.group_type));
            if !value.matches(group.group_type) {
                debug!(group_id = %group.id, "Coercing malformed selection to empty default");
                *value = SelectionValue::default_for(group.group_type);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Counting
    // -------------------------------------------------------------------------

    /// Number of selections in a group: 0/1 for single-choice, the
    /// selected count for multi-choice, the total quantity for
    /// quantity-choice.
    pub fn selected_count(&self, group_id: &str) -> u32 {
        match self.values.get(group_id) {
            Some(SelectionValue::Single(selected)) => u32::from(selected.is_some()),
            Some(SelectionValue::Multi(selected)) => selected.len() as u32,
            Some(SelectionValue::Quantity(quantities)) => quantities.values().sum(),
            None => 0,
        }
    }

    /// Quantity of one option in a quantity-choice group (0 if absent).
    pub fn quantity_of(&self, group_id: &str, option_id: &str) -> u32 {
        match self.values.get(group_id) {
            Some(SelectionValue::Quantity(quantities)) => {
                quantities.get(option_id).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// `single-choice`: replaces the current selection unconditionally.
    ///
    /// There is no deselect-to-null event; null is only the initial state.
    pub fn select(&mut self, product: &Product, group_id: &str, option_id: &str) -> CoreResult<()> {
        let group = group_for_event(product, group_id, GroupType::SingleChoice)?;
        selectable_option(group, option_id)?;
        self.values.insert(
            group.id.clone(),
            SelectionValue::Single(Some(option_id.to_string())),
        );
        Ok(())
    }

    /// `multi-choice`: removes the option if selected, otherwise adds it
    /// while the effective maximum allows. Over-limit adds are silent
    /// no-ops.
    pub fn toggle(&mut self, product: &Product, group_id: &str, option_id: &str) -> CoreResult<()> {
        let group = group_for_event(product, group_id, GroupType::MultiChoice)?;
        if group.option(option_id).is_none() {
            return Err(CoreError::OptionNotFound {
                group_id: group_id.to_string(),
                option_id: option_id.to_string(),
            });
        }
        let max = rules::effective_constraints(product, group, self).max_selections;

        let value = self.value_mut(group);
        let SelectionValue::Multi(selected) = value else {
            unreachable!("value_mut coerces to the group's shape");
        };

        if let Some(pos) = selected.iter().position(|id| id == option_id) {
            // Removal is always allowed, even for now-unavailable options.
            selected.remove(pos);
            return Ok(());
        }

        selectable_option(group, option_id)?;
        if (selected.len() as u32) < max {
            selected.push(option_id.to_string());
        } else {
            debug!(group_id = %group_id, option_id = %option_id, max = %max, "Toggle beyond effective max ignored");
        }
        Ok(())
    }

    /// `quantity-choice`: adds one unit while the group's total stays
    /// below the effective maximum; at the maximum the event is a silent
    /// no-op.
    pub fn increment(
        &mut self,
        product: &Product,
        group_id: &str,
        option_id: &str,
    ) -> CoreResult<()> {
        let group = group_for_event(product, group_id, GroupType::QuantityChoice)?;
        selectable_option(group, option_id)?;
        let max = rules::effective_constraints(product, group, self).max_selections;

        let value = self.value_mut(group);
        let SelectionValue::Quantity(quantities) = value else {
            unreachable!("value_mut coerces to the group's shape");
        };

        let total: u32 = quantities.values().sum();
        if total >= max {
            debug!(group_id = %group_id, option_id = %option_id, max = %max, "Increment beyond effective max ignored");
            return Ok(());
        }
        *quantities.entry(option_id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    /// `quantity-choice`: removes one unit, flooring at zero. Allowed for
    /// unavailable options so historical selections can be cleared.
    pub fn decrement(
        &mut self,
        product: &Product,
        group_id: &str,
        option_id: &str,
    ) -> CoreResult<()> {
        let group = group_for_event(product, group_id, GroupType::QuantityChoice)?;
        if group.option(option_id).is_none() {
            return Err(CoreError::OptionNotFound {
                group_id: group_id.to_string(),
                option_id: option_id.to_string(),
            });
        }

        let value = self.value_mut(group);
        let SelectionValue::Quantity(quantities) = value else {
            unreachable!("value_mut coerces to the group's shape");
        };

        if let Some(quantity) = quantities.get_mut(option_id) {
            *quantity = quantity.saturating_sub(1);
            if *quantity == 0 {
                quantities.remove(option_id);
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// Raw write access used by edit-mode reconstruction.
    pub(crate) fn set_raw(&mut self, group_id: String, value: SelectionValue) {
        self.values.insert(group_id, value);
    }

    /// Mutable access to a group's value, coerced to the group's shape.
    fn value_mut(&mut self, group: &OptionGroup) -> &mut SelectionValue {
        let value = self
            .values
            .entry(group.id.clone())
            .or_insert_with(|| SelectionValue::default_for(group.group_type));
        if !value.matches(group.group_type) {
            *value = SelectionValue::default_for(group.group_type);
        }
        value
    }
}

// =============================================================================
// Event Helpers
// =============================================================================

/// Resolves the group an event targets, checking it collects selections
/// the way the event assumes.
fn group_for_event<'a>(
    product: &'a Product,
    group_id: &str,
    expected: GroupType,
) -> CoreResult<&'a OptionGroup> {
    let group = product
        .group(group_id)
        .ok_or_else(|| CoreError::GroupNotFound(group_id.to_string()))?;
    if group.group_type != expected {
        return Err(CoreError::GroupTypeMismatch {
            group_id: group_id.to_string(),
            group_type: group.group_type,
        });
    }
    Ok(group)
}

/// Resolves an option for an *adding* event: it must exist and be
/// currently available.
fn selectable_option<'a>(group: &'a OptionGroup, option_id: &str) -> CoreResult<&'a GroupOption> {
    let option = group
        .option(option_id)
        .ok_or_else(|| CoreError::OptionNotFound {
            group_id: group.id.clone(),
            option_id: option_id.to_string(),
        })?;
    if !option.available {
        return Err(CoreError::OptionUnavailable {
            group_id: group.id.clone(),
            option_id: option_id.to_string(),
        });
    }
    Ok(option)
}

// =============================================================================
// Unit Tests
// =============================================================================

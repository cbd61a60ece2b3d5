//! # Catalog Types
//!
//! Read-only product definitions consumed by the customization engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │──►│   OptionGroup   │──►│  GroupOption    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id, name       │   │  id, name       │       │
//! │  │  base_price     │   │  type, required │   │  price_cents    │       │
//! │  │  groups[]       │   │  min/max        │   │  available      │       │
//! │  └─────────────────┘   │  depends_on?    │   │  price_matrix?  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  GroupDependency: parent's selected NAMES → override bounds            │
//! │  PriceMatrix:     parent's selected NAMES → override prices            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! These definitions are created and mutated by the store-management
//! service; this crate only reads them. A customization session clones the
//! product it works on and never writes back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Group Type
// =============================================================================

/// How a group collects selections. Exhaustive: there is no other variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    /// Exactly zero or one option (radio buttons).
    SingleChoice,
    /// A set of options, bounded by min/max (checkboxes).
    MultiChoice,
    /// A per-option quantity, bounded in total (steppers).
    QuantityChoice,
}

// =============================================================================
// Selection Bounds
// =============================================================================

/// Selection count bounds for a group.
///
/// The *static* bounds live on the group; the *effective* bounds are
/// resolved per interaction from the parent group's current selection
/// (see [`crate::rules::effective_constraints`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectionBounds {
    pub min_selections: u32,
    pub max_selections: u32,
}

impl SelectionBounds {
    /// Creates bounds from min and max.
    #[inline]
    pub const fn new(min_selections: u32, max_selections: u32) -> Self {
        SelectionBounds {
            min_selections,
            max_selections,
        }
    }
}

// =============================================================================
// Group Dependency
// =============================================================================

/// A dependency on an earlier group in the same product.
///
/// ## Invariant
/// `parent_group_index` must refer to a group appearing *earlier* in the
/// product's group list: no forward or cyclic dependencies. Enforced by
/// [`crate::validation::validate_catalog`]; the resolvers additionally
/// treat an out-of-range index as "no parent selection".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GroupDependency {
    /// Index of the parent group in `Product::groups`.
    pub parent_group_index: usize,

    /// Override bounds keyed by the parent's selected option *name*.
    /// When several parent selections match, the most permissive override
    /// wins (accumulated with max, see §rules).
    pub rules: BTreeMap<String, SelectionBounds>,
}

// =============================================================================
// Price Matrix
// =============================================================================

/// Conditional pricing for an option, keyed by the parent group's
/// selected option name.
///
/// When one or more parent selections match, the highest matched override
/// applies; otherwise the option's base price stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceMatrix {
    /// Index of the parent group in `Product::groups`.
    pub parent_group_index: usize,

    /// Override prices in cents, keyed by parent option name.
    pub prices: BTreeMap<String, i64>,
}

// =============================================================================
// Group Option
// =============================================================================

/// One selectable option inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GroupOption {
    /// Unique within the group.
    pub id: String,

    /// Display name. Also the key parent-dependent rules and price
    /// matrices match against.
    pub name: String,

    /// Optional description shown under the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Unavailable options are hidden from selection but may still appear
    /// in historical customizations.
    pub available: bool,

    /// Base incremental price in cents (may be 0).
    #[serde(default)]
    pub price_cents: i64,

    /// Conditional price overrides, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_matrix: Option<PriceMatrix>,
}

impl GroupOption {
    /// Returns the base incremental price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Option Group
// =============================================================================

/// A customization group belonging to exactly one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OptionGroup {
    /// Unique within the product.
    pub id: String,

    /// Display label ("Size", "Extras", ...). Referenced by violation
    /// messages, so it should be customer-readable.
    pub name: String,

    /// Whether the group must be completed before confirmation.
    /// A group is also *effectively* required while its resolved
    /// minimum is above zero (see validation).
    pub required: bool,

    /// How this group collects selections.
    #[serde(rename = "type")]
    pub group_type: GroupType,

    /// Static minimum selection count (meaning depends on `group_type`).
    #[serde(default)]
    pub min_selections: u32,

    /// Static maximum selection count (meaning depends on `group_type`).
    pub max_selections: u32,

    /// Ordered list of options.
    pub options: Vec<GroupOption>,

    /// Dependency on an earlier group, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<GroupDependency>,
}

impl OptionGroup {
    /// Finds an option by id.
    pub fn option(&self, option_id: &str) -> Option<&GroupOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Finds an option by display name.
    pub fn option_by_name(&self, name: &str) -> Option<&GroupOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The unconditional selection bounds.
    #[inline]
    pub fn static_bounds(&self) -> SelectionBounds {
        SelectionBounds::new(self.min_selections, self.max_selections)
    }

    /// Options currently offered for selection.
    pub fn available_options(&self) -> impl Iterator<Item = &GroupOption> {
        self.options.iter().filter(|o| o.available)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as seen by the customization engine.
///
/// ## Design Notes
/// Only the fields the engine reads are modeled here; the full catalog
/// document (images, category, city, store) belongs to the catalog
/// service. Group order matters: dependencies always point backwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name, frozen into cart lines.
    pub name: String,

    /// Base price in cents, before any customization.
    pub base_price_cents: i64,

    /// Customization groups, in display order.
    #[serde(default)]
    pub groups: Vec<OptionGroup>,
}

impl Product {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }

    /// Finds a group by id.
    pub fn group(&self, group_id: &str) -> Option<&OptionGroup> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Finds a group's index by id.
    pub fn group_index(&self, group_id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == group_id)
    }

    /// Whether the product has anything to customize.
    #[inline]
    pub fn is_customizable(&self) -> bool {
        !self.groups.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

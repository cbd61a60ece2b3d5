//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                       │
//! │  ├── CoreError     - Session/cart domain errors                        │
//! │  ├── CatalogError  - Malformed product definitions                     │
//! │  └── Violation     - Selection rule violations (reported, NOT thrown)  │
//! │                                                                         │
//! │  Flow: Violation list → UI inline messages (confirm stays disabled)    │
//! │        CoreError → API layer → serialized error for the storefront     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (group id, option id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Violations are data, not exceptions: they render as an inline list
//!    next to the confirm action and never abort the session

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::catalog::GroupType;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// All of these are local and recoverable: none are fatal to a
/// customization session. They should be caught and translated to
/// user-friendly messages by the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An event referenced a group id that does not exist on the product.
    #[error("Group not found: {0}")]
    GroupNotFound(String),

    /// An event referenced an option id that does not exist in the group.
    #[error("Option {option_id} not found in group {group_id}")]
    OptionNotFound { group_id: String, option_id: String },

    /// Attempted to select an option that is currently unavailable.
    ///
    /// ## When This Occurs
    /// - The storefront UI hides unavailable options, but a stale view can
    ///   still emit a selection event for one
    /// - Historical customizations may reference unavailable options; those
    ///   survive edit-mode reconstruction and can still be deselected, only
    ///   *adding* them anew is rejected
    #[error("Option {option_id} in group {group_id} is not available")]
    OptionUnavailable { group_id: String, option_id: String },

    /// An event does not apply to the group's selection type.
    ///
    /// ## When This Occurs
    /// - `select` sent to a multi-choice group
    /// - `increment`/`decrement` sent to anything but quantity-choice
    #[error("Group {group_id} is {group_type:?}, cannot apply this event")]
    GroupTypeMismatch {
        group_id: String,
        group_type: GroupType,
    },

    /// Free-text observations exceed the allowed length.
    #[error("Observations cannot exceed {max} characters (got {len})")]
    ObservationsTooLong { len: usize, max: usize },

    /// Confirmation was requested while the selection still has violations.
    ///
    /// The engine reports, it never clamps: the caller must resolve the
    /// violations (or surface them) before confirming.
    #[error("Cannot confirm customization: {} unresolved violation(s)", violations.len())]
    InvalidSelections { violations: Vec<Violation> },

    /// Quantity must be a positive number of units.
    #[error("Quantity must be positive, got {requested}")]
    InvalidQuantity { requested: i64 },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Cart line not found.
    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    /// Catalog definition error (wraps CatalogError).
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

// =============================================================================
// Catalog Error
// =============================================================================

/// Product definition errors.
///
/// The catalog is authored by the store-management service and read-only
/// here; these errors surface authoring mistakes before a broken product
/// reaches a customization session.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two groups on the same product share an id.
    #[error("Duplicate group id '{group_id}' in product {product_id}")]
    DuplicateGroupId { product_id: String, group_id: String },

    /// Two options in the same group share an id.
    #[error("Duplicate option id '{option_id}' in group {group_id}")]
    DuplicateOptionId { group_id: String, option_id: String },

    /// A dependency must reference a group earlier in the product's group
    /// list. Forward or self references would allow cycles.
    #[error("Group {group_id} depends on group index {parent_index}, which does not precede it")]
    ForwardDependency { group_id: String, parent_index: usize },

    /// A price matrix must reference a group earlier in the product's
    /// group list, same rule as dependencies.
    #[error("Option {option_id} has a price matrix referencing group index {parent_index}, which does not precede its group")]
    ForwardPriceMatrix { option_id: String, parent_index: usize },

    /// Static bounds with min above max can never be satisfied.
    #[error("Group {group_id} has minSelections {min} greater than maxSelections {max}")]
    InvertedBounds { group_id: String, min: u32, max: u32 },
}

// =============================================================================
// Violation
// =============================================================================

/// A selection rule violation.
///
/// Violations are *reported*, never thrown: `validate` returns the full
/// list and the UI renders it inline, blocking the confirm action while
/// the list is non-empty.
///
/// ## Why an Enum?
/// The `Display` impl (via thiserror) yields the exact human-readable
/// message; the structured fields let the UI anchor each message to its
/// group without parsing strings.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Violation {
    /// A required single-choice group has no selection.
    #[error("Select one option in {group_name}")]
    #[serde(rename_all = "camelCase")]
    SelectOne { group_id: String, group_name: String },

    /// A required multi-choice or quantity-choice group is below its
    /// effective minimum.
    #[error("Select at least {min} in {group_name}")]
    #[serde(rename_all = "camelCase")]
    SelectAtLeast {
        group_id: String,
        group_name: String,
        min: u32,
    },

    /// A multi-choice or quantity-choice group is above its effective
    /// maximum (possible after a parent change shrank the bounds).
    #[error("Maximum of {max} selections in {group_name}")]
    #[serde(rename_all = "camelCase")]
    MaxSelections {
        group_id: String,
        group_name: String,
        max: u32,
    },

    /// A required dependent group cannot be completed until its parent
    /// group has a selection.
    #[error("Select {parent_name} first for {group_name}")]
    #[serde(rename_all = "camelCase")]
    ParentFirst {
        group_id: String,
        group_name: String,
        parent_name: String,
    },
}

impl Violation {
    /// The id of the group this violation is about.
    pub fn group_id(&self) -> &str {
        match self {
            Violation::SelectOne { group_id, .. }
            | Violation::SelectAtLeast { group_id, .. }
            | Violation::MaxSelections { group_id, .. }
            | Violation::ParentFirst { group_id, .. } => group_id,
        }
    }

    /// The display name of the group this violation is about.
    pub fn group_name(&self) -> &str {
        match self {
            Violation::SelectOne { group_name, .. }
            | Violation::SelectAtLeast { group_name, .. }
            | Violation::MaxSelections { group_name, .. }
            | Violation::ParentFirst { group_name, .. } => group_name,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OptionNotFound {
            group_id: "extras".to_string(),
            option_id: "bacon".to_string(),
        };
        assert_eq!(err.to_string(), "Option bacon not found in group extras");
    }

    #[test]
    fn test_violation_messages() {
        let v = Violation::SelectOne {
            group_id: "size".to_string(),
            group_name: "Size".to_string(),
        };
        assert_eq!(v.to_string(), "Select one option in Size");

        let v = Violation::SelectAtLeast {
            group_id: "extras".to_string(),
            group_name: "Extras".to_string(),
            min: 2,
        };
        assert_eq!(v.to_string(), "Select at least 2 in Extras");

        let v = Violation::MaxSelections {
            group_id: "extras".to_string(),
            group_name: "Extras".to_string(),
            max: 3,
        };
        assert_eq!(v.to_string(), "Maximum of 3 selections in Extras");

        let v = Violation::ParentFirst {
            group_id: "sauce".to_string(),
            group_name: "Sauce".to_string(),
            parent_name: "Size".to_string(),
        };
        assert_eq!(v.to_string(), "Select Size first for Sauce");
    }

    #[test]
    fn test_violation_group_accessors() {
        let v = Violation::MaxSelections {
            group_id: "extras".to_string(),
            group_name: "Extras".to_string(),
            max: 2,
        };
        assert_eq!(v.group_id(), "extras");
        assert_eq!(v.group_name(), "Extras");
    }

    #[test]
    fn test_catalog_converts_to_core_error() {
        let catalog_err = CatalogError::InvertedBounds {
            group_id: "extras".to_string(),
            min: 3,
            max: 1,
        };
        let core_err: CoreError = catalog_err.into();
        assert!(matches!(core_err, CoreError::Catalog(_)));
    }
}

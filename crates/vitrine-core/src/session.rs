//! # Customization Session
//!
//! The facade the storefront drives. One session per open customization
//! dialog: created fresh on add-to-cart, or seeded from a stored
//! customization when a cart line is edited, and discarded on confirm or
//! cancel.
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Customization Session                                │
//! │                                                                         │
//! │  ┌──────────┐  select/toggle   ┌──────────┐   confirm()   ┌──────────┐ │
//! │  │  Fresh   │────increment────►│ Editing  │──────────────►│ AddToCart│ │
//! │  │ (or edit │    decrement     │          │  (only while  │ payload  │ │
//! │  │  seed)   │◄────────────────►│          │   valid)      │          │ │
//! │  └──────────┘                  └──────────┘               └──────────┘ │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │        every interaction re-reads: total(), violations(),              │
//! │        effective_constraints(), effective_price()                      │
//! │                                                                         │
//! │  Purely synchronous, no I/O: the session owns its Selections value     │
//! │  exclusively and never mutates the product definitions.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::{Product, SelectionBounds};
use crate::customization::{build_customization, selections_for_edit, Customization};
use crate::error::{CoreError, CoreResult, Violation};
use crate::money::Money;
use crate::selection::Selections;
use crate::{pricing, rules, validation};

// =============================================================================
// AddToCart Payload
// =============================================================================

/// What a confirmed session hands to the cart-persistence collaborator.
///
/// The collaborator treats `(product_id, customization_hash)` as the
/// cart-line identity: on match it increments the existing line's
/// quantity, otherwise it inserts a new line (see [`crate::cart`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: String,
    pub quantity: i64,
    pub customizations: Customization,
    pub customization_hash: String,
}

// =============================================================================
// Session
// =============================================================================

/// One customization flow over one product.
///
/// ## Design Notes
/// - Owns a clone of the product: catalog updates mid-session do not
///   shift prices or bounds under the customer
/// - All derived values (price, violations, bounds) are recomputed per
///   read; nothing is cached, so dependent groups always see the
///   parent's latest selection
#[derive(Debug, Clone)]
pub struct CustomizationSession {
    product: Product,
    selections: Selections,
    quantity: i64,
    observations: String,
}

impl CustomizationSession {
    /// Opens a fresh session: every group starts empty, quantity 1.
    pub fn new(product: Product) -> Self {
        debug!(product_id = %product.id, "Opening customization session");
        let selections = Selections::empty_for(&product);
        CustomizationSession {
            product,
            selections,
            quantity: 1,
            observations: String::new(),
        }
    }

    /// Opens a session seeded from a stored customization (edit mode).
    ///
    /// Stored entries referencing groups or options that no longer exist
    /// are silently skipped so "edit my past order" keeps working after
    /// the store owner changes the menu.
    pub fn for_edit(product: Product, customization: &Customization, quantity: i64) -> Self {
        debug!(product_id = %product.id, quantity = %quantity, "Opening edit session from stored customization");
        let selections = selections_for_edit(&product, customization);
        CustomizationSession {
            product,
            selections,
            quantity: quantity.max(1),
            observations: customization.observations.clone().unwrap_or_default(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn observations(&self) -> &str {
        &self.observations
    }

    // -------------------------------------------------------------------------
    // UI Events
    // -------------------------------------------------------------------------

    /// Replaces a single-choice group's selection.
    pub fn select(&mut self, group_id: &str, option_id: &str) -> CoreResult<()> {
        debug!(group_id = %group_id, option_id = %option_id, "select");
        self.selections.select(&self.product, group_id, option_id)
    }

    /// Toggles an option in a multi-choice group.
    pub fn toggle(&mut self, group_id: &str, option_id: &str) -> CoreResult<()> {
        debug!(group_id = %group_id, option_id = %option_id, "toggle");
        self.selections.toggle(&self.product, group_id, option_id)
    }

    /// Adds one unit of an option in a quantity-choice group.
    pub fn increment(&mut self, group_id: &str, option_id: &str) -> CoreResult<()> {
        debug!(group_id = %group_id, option_id = %option_id, "increment");
        self.selections
            .increment(&self.product, group_id, option_id)
    }

    /// Removes one unit of an option in a quantity-choice group.
    pub fn decrement(&mut self, group_id: &str, option_id: &str) -> CoreResult<()> {
        debug!(group_id = %group_id, option_id = %option_id, "decrement");
        self.selections
            .decrement(&self.product, group_id, option_id)
    }

    /// Sets how many units will be added to the cart.
    pub fn set_quantity(&mut self, quantity: i64) -> CoreResult<()> {
        validation::validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Sets the free-text observations ("no onions").
    pub fn set_observations(&mut self, text: &str) -> CoreResult<()> {
        validation::validate_observations(text)?;
        self.observations = text.to_string();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Live Derived State (re-read after every event)
    // -------------------------------------------------------------------------

    /// The actual min/max bounds of a group under the current selections.
    pub fn effective_constraints(&self, group_id: &str) -> CoreResult<SelectionBounds> {
        let group = self
            .product
            .group(group_id)
            .ok_or_else(|| CoreError::GroupNotFound(group_id.to_string()))?;
        Ok(rules::effective_constraints(
            &self.product,
            group,
            &self.selections,
        ))
    }

    /// The actual incremental price of an option under the current
    /// selections.
    pub fn effective_price(&self, group_id: &str, option_id: &str) -> CoreResult<Money> {
        let group = self
            .product
            .group(group_id)
            .ok_or_else(|| CoreError::GroupNotFound(group_id.to_string()))?;
        let option = group
            .option(option_id)
            .ok_or_else(|| CoreError::OptionNotFound {
                group_id: group_id.to_string(),
                option_id: option_id.to_string(),
            })?;
        Ok(rules::effective_price(
            &self.product,
            option,
            &self.selections,
        ))
    }

    /// Current violations, in group order. Empty means confirmable.
    pub fn violations(&self) -> Vec<Violation> {
        validation::validate(&self.product, &self.selections)
    }

    /// Whether the selection can be confirmed.
    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    /// The customized price of one unit.
    pub fn unit_price(&self) -> Money {
        pricing::unit_price(&self.product, &self.selections)
    }

    /// The customized unit price × quantity.
    pub fn total(&self) -> Money {
        pricing::total_price(&self.product, &self.selections, self.quantity)
    }

    // -------------------------------------------------------------------------
    // Confirmation
    // -------------------------------------------------------------------------

    /// Freezes the session into an [`AddToCart`] payload.
    ///
    /// ## Behavior
    /// - Fails with [`CoreError::InvalidSelections`] while violations
    ///   exist: the engine reports, it never clamps or auto-fixes
    /// - Effective prices are resolved now and frozen into the
    ///   customization entries
    /// - The identity hash excludes observations by design
    pub fn confirm(&self) -> CoreResult<AddToCart> {
        let violations = self.violations();
        if !violations.is_empty() {
            return Err(CoreError::InvalidSelections { violations });
        }

        let customizations = build_customization(&self.product, &self.selections, &self.observations);
        let customization_hash = customizations.identity_hash();
        debug!(
            product_id = %self.product.id,
            quantity = %self.quantity,
            customization_hash = %customization_hash,
            "Confirming customization"
        );

        Ok(AddToCart {
            product_id: self.product.id.clone(),
            quantity: self.quantity,
            customizations,
            customization_hash,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

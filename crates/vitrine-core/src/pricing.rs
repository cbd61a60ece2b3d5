//! # Pricing Aggregator
//!
//! Sums the base price and every effective option contribution into the
//! customized unit price, then multiplies by quantity.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Price Aggregation                                  │
//! │                                                                         │
//! │  product.base_price                                                     │
//! │       +                                                                 │
//! │  single-choice:   effective_price(selected option)                     │
//! │  multi-choice:    Σ effective_price(option) over selected              │
//! │  quantity-choice: Σ effective_price(option) × qty over qty > 0         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  unit_price ───× quantity───► total_price                              │
//! │                                                                         │
//! │  Quantity multiplies the FULLY CUSTOMIZED unit price, not just the     │
//! │  base: a customization is priced per unit.                             │
//! │                                                                         │
//! │  No rounding happens here: cents in, cents out. Currency formatting    │
//! │  is the storefront's concern.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::catalog::Product;
use crate::money::Money;
use crate::rules;
use crate::selection::{SelectionValue, Selections};

// =============================================================================
// Aggregation
// =============================================================================

/// The price of one unit with the current customizations applied.
///
/// Stale option ids in the selection state contribute nothing.
pub fn unit_price(product: &Product, selections: &Selections) -> Money {
    let mut total = product.base_price();

    for group in &product.groups {
        let Some(value) = selections.selection(&group.id) else {
            continue;
        };

        match value {
            SelectionValue::Single(Some(option_id)) => {
                if let Some(option) = group.option(option_id) {
                    total += rules::effective_price(product, option, selections);
                }
            }
            SelectionValue::Single(None) => {}
            SelectionValue::Multi(option_ids) => {
                for option_id in option_ids {
                    if let Some(option) = group.option(option_id) {
                        total += rules::effective_price(product, option, selections);
                    }
                }
            }
            SelectionValue::Quantity(quantities) => {
                for (option_id, &quantity) in quantities {
                    if quantity > 0 {
                        if let Some(option) = group.option(option_id) {
                            total += rules::effective_price(product, option, selections)
                                * i64::from(quantity);
                        }
                    }
                }
            }
        }
    }

    total
}

/// The line total: customized unit price × quantity.
pub fn total_price(product: &Product, selections: &Selections, quantity: i64) -> Money {
    unit_price(product, selections).multiply_quantity(quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================

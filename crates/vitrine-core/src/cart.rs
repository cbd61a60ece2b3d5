//! # Cart Model
//!
//! The in-memory cart consuming confirmed [`AddToCart`] payloads. This is
//! the reference implementation of the upsert contract the persistence
//! collaborator must honor.
//!
//! ## Upsert-by-hash Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Line Identity                                   │
//! │                                                                         │
//! │  AddToCart { product_id, quantity, customizations, hash }              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  existing line with (product_id, customization_hash)?                  │
//! │       │                                                                 │
//! │       ├── yes ──► quantity += payload.quantity   (merge, no new line)  │
//! │       │                                                                 │
//! │       └── no  ──► push new line (uuid id, frozen unit price)           │
//! │                                                                         │
//! │  Same burger, same options, clicked twice → ONE line, quantity 2.      │
//! │  Same burger, different options → two lines.                           │
//! │  Different notes only → SAME line (hash excludes observations).        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `(product_id, customization_hash)`
//! - Quantity is always 1..=MAX_LINE_QUANTITY (update to 0 removes)
//! - Maximum lines: MAX_CART_LINES
//! - Unit prices are frozen at confirmation time; catalog changes never
//!   reprice an existing line

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Product;
use crate::customization::Customization;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::session::AddToCart;
use crate::validation;
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One line in the cart.
///
/// ## Dual-Key Identity
/// - `id`: UUID v4, immutable, for UI row keys and repository relations
/// - Business identity: `(product_id, customization_hash)`, what merging
///   is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Line id (UUID v4).
    pub id: String,

    /// Product this line refers to.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Customized unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Units of this configuration.
    pub quantity: i64,

    /// The confirmed customization, including observations.
    pub customizations: Customization,

    /// Identity hash of the customization (empty for uncustomized).
    pub customization_hash: String,

    /// When this line was first added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new line from a confirmed payload.
    ///
    /// ## Price Freezing
    /// The unit price is the product's base price plus the frozen option
    /// prices inside the customization, captured at this moment.
    fn from_payload(product: &Product, payload: AddToCart) -> Self {
        let unit_price = product.base_price() + payload.customizations.price_delta();
        CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: payload.product_id,
            product_name: product.name.clone(),
            unit_price_cents: unit_price.cents(),
            quantity: payload.quantity,
            customizations: payload.customizations,
            customization_hash: payload.customization_hash,
            added_at: Utc::now(),
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Lines in the cart.
    pub lines: Vec<CartLine>,

    /// When the cart was created/last cleared.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a confirmed payload to the cart, merging by identity.
    ///
    /// ## Behavior
    /// - A line with the same `(product_id, customization_hash)` exists:
    ///   its quantity increases; its observations and frozen prices are
    ///   left as first confirmed
    /// - Otherwise a new line is appended with a frozen unit price
    pub fn add(&mut self, product: &Product, payload: AddToCart) -> CoreResult<()> {
        validation::validate_quantity(payload.quantity)?;

        if let Some(line) = self.lines.iter_mut().find(|l| {
            l.product_id == payload.product_id
                && l.customization_hash == payload.customization_hash
        }) {
            let new_quantity = line.quantity + payload.quantity;
            if new_quantity > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_quantity,
                    max: MAX_LINE_QUANTITY,
                });
            }
            debug!(line_id = %line.id, quantity = %new_quantity, "Merged payload into existing cart line");
            line.quantity = new_quantity;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let line = CartLine::from_payload(product, payload);
        debug!(line_id = %line.id, product_id = %line.product_id, "Added new cart line");
        self.lines.push(line);
        Ok(())
    }

    /// Updates the quantity of a line.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the line
    /// - Quantity above MAX_LINE_QUANTITY is rejected
    pub fn update_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(line_id);
        }
        validation::validate_quantity(quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line by id.
    pub fn remove_line(&mut self, line_id: &str) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| l.id != line_id);

        if self.lines.len() == initial_len {
            Err(CoreError::LineNotFound(line_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the cart total.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Cart totals summary for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_cents: cart.total_cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

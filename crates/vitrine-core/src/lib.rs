//! # vitrine-core: Pure Business Logic for Vitrine
//!
//! This crate is the **heart** of Vitrine's product customization flow.
//! It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (React)                           │   │
//! │  │   Product Page ──► Customization Modal ──► Cart ──► Checkout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ generated TS bindings                  │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vitrine-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌───────────┐ ┌───────┐ │   │
//! │  │  │ catalog │ │  rules  │ │selection │ │customiza- │ │ cart  │ │   │
//! │  │  │ Product │ │effective│ │  state   │ │tion+hash  │ │upsert │ │   │
//! │  │  │ Groups  │ │bounds & │ │ machine  │ │validation │ │by hash│ │   │
//! │  │  │ Options │ │ prices  │ │          │ │pricing    │ │       │ │   │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └───────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          Cart persistence / catalog CRUD (external)             │   │
//! │  │   upserts lines keyed by (product_id, customization_hash)       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Read-only product/group/option definitions
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`rules`] - Effective constraint and price resolution
//! - [`selection`] - Per-session selection state machine
//! - [`validation`] - Selection rules and catalog integrity checks
//! - [`customization`] - Persisted customizations, identity hashing,
//!   edit-mode reconstruction
//! - [`pricing`] - Unit and total price aggregation
//! - [`session`] - The customization session facade
//! - [`cart`] - Cart model with upsert-by-hash merging
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input =
//!    same output. Derived state (bounds, prices, violations) is
//!    recomputed per read, never cached.
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors
//! 4. **Report, don't clamp**: validation yields a violation list; the
//!    engine never auto-fixes a customer's selection
//!
//! ## Example Usage
//!
//! ```rust
//! use vitrine_core::{Cart, CustomizationSession, Product};
//!
//! # fn demo(product: Product) -> vitrine_core::CoreResult<()> {
//! let mut session = CustomizationSession::new(product.clone());
//! session.select("size", "large")?;
//! session.toggle("extras", "bacon")?;
//! session.set_quantity(2)?;
//!
//! if session.is_valid() {
//!     let payload = session.confirm()?;
//!     let mut cart = Cart::new();
//!     cart.add(&product, payload)?;
//! }
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod customization;
pub mod error;
pub mod money;
pub mod pricing;
pub mod rules;
pub mod selection;
pub mod session;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vitrine_core::Money` instead of
// `use vitrine_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use catalog::{
    GroupDependency, GroupOption, GroupType, OptionGroup, PriceMatrix, Product, SelectionBounds,
};
pub use customization::{Customization, CustomizationGroup, SelectedOption};
pub use error::{CatalogError, CoreError, CoreResult, Violation};
pub use money::Money;
pub use selection::{SelectionValue, Selections};
pub use session::{AddToCart, CustomizationSession};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of the free-text observations on a customization,
/// in characters after trimming.
pub const MAX_OBSERVATIONS_LEN: usize = 500;

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable order sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in the cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Configurable per-store in future versions.
pub const MAX_LINE_QUANTITY: i64 = 999;

//! # Customization & Identity Hashing
//!
//! Converts the transient selection state into the persisted
//! `Customization` form, derives the deterministic identity hash used
//! for cart-line merging, and reconstructs selections when a stored
//! customization is reopened for editing.
//!
//! ## Identity Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Customization Identity                                  │
//! │                                                                         │
//! │  Selections ──► build_customization() ──► Customization                │
//! │                      │                        │                         │
//! │                      │                        ▼                         │
//! │                      │                  identity_hash()                 │
//! │                      │                        │                         │
//! │                      ▼                        ▼                         │
//! │        effective prices FROZEN      (product_id, hash) = cart-line     │
//! │        at confirmation time          identity for upsert merging       │
//! │                                                                         │
//! │  Hash input: group ids sorted, selected entries sorted by option id,   │
//! │  observations EXCLUDED. Two carts built in any click order agree.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Observations Are Excluded From the Hash
//! Free-text notes must not fragment cart-line merging: two otherwise
//! identical customizations with different notes are the same priced
//! configuration and should land on the same line. This is a deliberate
//! product decision, not an oversight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use ts_rs::TS;

use crate::catalog::{GroupType, Product};
use crate::money::Money;
use crate::rules;
use crate::selection::{SelectionValue, Selections};

/// Byte separating fields inside one hashed entry.
const FIELD_SEP: u8 = 0x1f;
/// Byte separating hashed entries and groups.
const ENTRY_SEP: u8 = 0x1e;

// =============================================================================
// Persisted Types
// =============================================================================

/// One confirmed option inside a customization group.
///
/// `price_cents` is the *effective* price at confirmation time, frozen:
/// later catalog price changes must not retroactively alter historical
/// customizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub option_id: String,
    pub name: String,
    pub price_cents: i64,
    /// Present only for quantity-choice groups, and only above zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl SelectedOption {
    /// Units this entry contributes to pricing (1 unless quantity-based).
    #[inline]
    fn units(&self) -> i64 {
        i64::from(self.quantity.unwrap_or(1))
    }
}

/// The confirmed state of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationGroup {
    pub group_name: String,
    #[serde(rename = "type")]
    pub group_type: GroupType,
    pub selected: Vec<SelectedOption>,
}

/// A confirmed customization, one per cart line.
///
/// Groups with empty selections are omitted entirely (never stored as
/// empty arrays) so the identity hash stays stable regardless of which
/// optional groups a given product happens to have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    /// Confirmed groups keyed by group id.
    pub groups: BTreeMap<String, CustomizationGroup>,

    /// Trimmed free-text notes ("no onions"). Present only when
    /// non-empty. Never part of the identity hash.
    #[serde(
        rename = "_observations",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub observations: Option<String>,
}

impl Customization {
    /// Whether nothing was customized (observations do not count).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The total price contribution of the frozen option prices for one
    /// unit of product.
    pub fn price_delta(&self) -> Money {
        self.groups
            .values()
            .flat_map(|group| group.selected.iter())
            .map(|entry| Money::from_cents(entry.price_cents) * entry.units())
            .sum()
    }

    /// Derives the deterministic identity hash for cart-line merging.
    ///
    /// ## Guarantees
    /// - Same group/option/quantity content → same hash, regardless of
    ///   the order selections were made in (group keys are sorted, each
    ///   group's entries are sorted by option id, falling back to name)
    /// - Observations never affect the result
    /// - Stable across process restarts (SHA-256, no per-process state)
    /// - The empty customization hashes to the empty-string sentinel
    pub fn identity_hash(&self) -> String {
        if self.groups.is_empty() {
            return String::new();
        }

        let mut hasher = Sha256::new();
        for (group_id, group) in &self.groups {
            hasher.update(group_id.as_bytes());
            hasher.update([FIELD_SEP, type_tag(group.group_type), ENTRY_SEP]);

            let mut entries: Vec<&SelectedOption> = group.selected.iter().collect();
            entries.sort_by(|a, b| {
                a.option_id
                    .cmp(&b.option_id)
                    .then_with(|| a.name.cmp(&b.name))
            });
            for entry in entries {
                hasher.update(entry.option_id.as_bytes());
                hasher.update([FIELD_SEP]);
                hasher.update(entry.name.as_bytes());
                hasher.update([FIELD_SEP]);
                hasher.update(entry.price_cents.to_be_bytes());
                hasher.update(entry.quantity.unwrap_or(1).to_be_bytes());
                hasher.update([ENTRY_SEP]);
            }
        }

        let digest = hasher.finalize();
        hex::encode(&digest[..8]) // 16 hex chars: short but collision-unlikely
    }
}

/// Stable tag bytes per group type for the hash input.
const fn type_tag(group_type: GroupType) -> u8 {
    match group_type {
        GroupType::SingleChoice => 0,
        GroupType::MultiChoice => 1,
        GroupType::QuantityChoice => 2,
    }
}

// =============================================================================
// Building
// =============================================================================

/// Builds the persisted customization from the current selections.
///
/// Effective prices are resolved now and frozen into the entries. Groups
/// whose selection is empty are omitted; stale option ids (no longer on
/// the group) are skipped.
pub fn build_customization(
    product: &Product,
    selections: &Selections,
    observations: &str,
) -> Customization {
    let mut groups = BTreeMap::new();

    for group in &product.groups {
        let Some(value) = selections.selection(&group.id) else {
            continue;
        };

        let mut selected = Vec::new();
        match value {
            SelectionValue::Single(Some(option_id)) => {
                push_entry(&mut selected, product, group, selections, option_id, None);
            }
            SelectionValue::Single(None) => {}
            SelectionValue::Multi(option_ids) => {
                for option_id in option_ids {
                    push_entry(&mut selected, product, group, selections, option_id, None);
                }
            }
            SelectionValue::Quantity(quantities) => {
                for (option_id, &quantity) in quantities {
                    if quantity > 0 {
                        push_entry(
                            &mut selected,
                            product,
                            group,
                            selections,
                            option_id,
                            Some(quantity),
                        );
                    }
                }
            }
        }

        if !selected.is_empty() {
            groups.insert(
                group.id.clone(),
                CustomizationGroup {
                    group_name: group.name.clone(),
                    group_type: group.group_type,
                    selected,
                },
            );
        }
    }

    let observations = observations.trim();
    Customization {
        groups,
        observations: (!observations.is_empty()).then(|| observations.to_string()),
    }
}

fn push_entry(
    selected: &mut Vec<SelectedOption>,
    product: &Product,
    group: &crate::catalog::OptionGroup,
    selections: &Selections,
    option_id: &str,
    quantity: Option<u32>,
) {
    let Some(option) = group.option(option_id) else {
        debug!(group_id = %group.id, option_id = %option_id, "Skipping stale option id while building customization");
        return;
    };
    selected.push(SelectedOption {
        option_id: option.id.clone(),
        name: option.name.clone(),
        price_cents: rules::effective_price(product, option, selections).cents(),
        quantity,
    });
}

// =============================================================================
// Edit-mode Reconstruction
// =============================================================================

/// Rebuilds the selection state from a stored customization so a cart
/// line can be edited.
///
/// ## Leniency
/// The catalog may have changed since the customization was confirmed:
/// - a stored group id absent from the product is ignored,
/// - a stored option id absent from its group is skipped,
/// - everything else reconstructs against the group's *current* type.
///
/// Groups without a stored entry start at their empty default, exactly
/// as in a fresh session.
pub fn selections_for_edit(product: &Product, customization: &Customization) -> Selections {
    let mut selections = Selections::empty_for(product);

    for (group_id, stored) in &customization.groups {
        let Some(group) = product.group(group_id) else {
            debug!(group_id = %group_id, "Ignoring stored group no longer on the product");
            continue;
        };

        let known_ids = || {
            stored
                .selected
                .iter()
                .filter(|entry| group.option(&entry.option_id).is_some())
        };

        let value = match group.group_type {
            GroupType::SingleChoice => SelectionValue::Single(
                known_ids().next().map(|entry| entry.option_id.clone()),
            ),
            GroupType::MultiChoice => {
                let mut ids: Vec<String> = Vec::new();
                for entry in known_ids() {
                    if !ids.contains(&entry.option_id) {
                        ids.push(entry.option_id.clone());
                    }
                }
                SelectionValue::Multi(ids)
            }
            GroupType::QuantityChoice => {
                let mut quantities = BTreeMap::new();
                for entry in known_ids() {
                    let quantity = entry.quantity.unwrap_or(1);
                    if quantity > 0 {
                        quantities.insert(entry.option_id.clone(), quantity);
                    }
                }
                SelectionValue::Quantity(quantities)
            }
        };

        selections.set_raw(group.id.clone(), value);
    }

    selections
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GroupOption, OptionGroup};

    fn option(id: &str, name: &str, price_cents: i64) -> GroupOption {
        GroupOption {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            available: true,
            price_cents,
            price_matrix: None,
        }
    }

    fn test_product() -> Product {
        Product {
            id: "prod-1".to_string(),
            name: "Burger".to_string(),
            base_price_cents: 2000,
            groups: vec![
                OptionGroup {
                    id: "size".to_string(),
                    name: "Size".to_string(),
                    required: true,
                    group_type: GroupType::SingleChoice,
                    min_selections: 0,
                    max_selections: 1,
                    options: vec![option("small", "Small", 0), option("large", "Large", 500)],
                    depends_on: None,
                },
                OptionGroup {
                    id: "extras".to_string(),
                    name: "Extras".to_string(),
                    required: false,
                    group_type: GroupType::MultiChoice,
                    min_selections: 0,
                    max_selections: 2,
                    options: vec![
                        option("bacon", "Bacon", 200),
                        option("cheddar", "Cheddar", 300),
                    ],
                    depends_on: None,
                },
                OptionGroup {
                    id: "toppings".to_string(),
                    name: "Toppings".to_string(),
                    required: false,
                    group_type: GroupType::QuantityChoice,
                    min_selections: 0,
                    max_selections: 3,
                    options: vec![option("olive", "Olive", 100), option("egg", "Egg", 150)],
                    depends_on: None,
                },
            ],
        }
    }

    #[test]
    fn test_build_omits_empty_groups() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();

        let customization = build_customization(&product, &selections, "");
        assert_eq!(customization.groups.len(), 1);
        assert!(customization.groups.contains_key("size"));
        assert!(customization.observations.is_none());
    }

    #[test]
    fn test_build_freezes_prices_and_quantities() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();
        selections.increment(&product, "toppings", "olive").unwrap();
        selections.increment(&product, "toppings", "olive").unwrap();

        let customization = build_customization(&product, &selections, "  no onions  ");

        let size = &customization.groups["size"];
        assert_eq!(size.group_name, "Size");
        assert_eq!(size.selected[0].price_cents, 500);
        assert_eq!(size.selected[0].quantity, None);

        let toppings = &customization.groups["toppings"];
        assert_eq!(toppings.selected[0].quantity, Some(2));
        assert_eq!(toppings.selected[0].price_cents, 100);

        assert_eq!(customization.observations.as_deref(), Some("no onions"));
    }

    #[test]
    fn test_price_delta() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();
        selections.toggle(&product, "extras", "bacon").unwrap();
        selections.increment(&product, "toppings", "egg").unwrap();
        selections.increment(&product, "toppings", "egg").unwrap();

        let customization = build_customization(&product, &selections, "");
        // 500 (Large) + 200 (Bacon) + 2 × 150 (Egg)
        assert_eq!(customization.price_delta().cents(), 1000);
    }

    #[test]
    fn test_empty_customization_hashes_to_sentinel() {
        let product = test_product();
        let selections = Selections::empty_for(&product);

        let customization = build_customization(&product, &selections, "");
        assert!(customization.is_empty());
        assert_eq!(customization.identity_hash(), "");
    }

    #[test]
    fn test_hash_is_idempotent() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "small").unwrap();
        selections.toggle(&product, "extras", "bacon").unwrap();

        let customization = build_customization(&product, &selections, "");
        assert_eq!(customization.identity_hash(), customization.identity_hash());
        assert_eq!(customization.identity_hash().len(), 16);
    }

    #[test]
    fn test_hash_ignores_selection_order() {
        // Scenario: {Extras: [Bacon, Cheddar]} vs {Extras: [Cheddar, Bacon]}.
        let product = test_product();

        let mut first = Selections::empty_for(&product);
        first.toggle(&product, "extras", "bacon").unwrap();
        first.toggle(&product, "extras", "cheddar").unwrap();

        let mut second = Selections::empty_for(&product);
        second.toggle(&product, "extras", "cheddar").unwrap();
        second.toggle(&product, "extras", "bacon").unwrap();

        let a = build_customization(&product, &first, "");
        let b = build_customization(&product, &second, "");
        assert_ne!(
            a.groups["extras"].selected[0].option_id,
            b.groups["extras"].selected[0].option_id,
            "stored order reflects insertion order"
        );
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn test_hash_ignores_observations() {
        // Different notes, same priced configuration: must merge.
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();

        let with_notes = build_customization(&product, &selections, "no onions");
        let without_notes = build_customization(&product, &selections, "");

        assert_eq!(with_notes.observations.as_deref(), Some("no onions"));
        assert_eq!(without_notes.observations, None);
        assert_eq!(with_notes.identity_hash(), without_notes.identity_hash());
    }

    #[test]
    fn test_hash_sensitivity() {
        let product = test_product();
        let mut hashes = std::collections::HashSet::new();

        // A representative spread of distinct configurations.
        let configs: Vec<Box<dyn Fn(&mut Selections)>> = vec![
            Box::new(|s: &mut Selections| {
                s.select(&test_product(), "size", "small").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.select(&test_product(), "size", "large").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.toggle(&test_product(), "extras", "bacon").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.toggle(&test_product(), "extras", "bacon").unwrap();
                s.toggle(&test_product(), "extras", "cheddar").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.increment(&test_product(), "toppings", "olive").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.increment(&test_product(), "toppings", "olive").unwrap();
                s.increment(&test_product(), "toppings", "olive").unwrap();
            }),
            Box::new(|s: &mut Selections| {
                s.select(&test_product(), "size", "small").unwrap();
                s.toggle(&test_product(), "extras", "bacon").unwrap();
            }),
        ];

        for config in configs {
            let mut selections = Selections::empty_for(&product);
            config(&mut selections);
            let hash = build_customization(&product, &selections, "").identity_hash();
            assert!(
                hashes.insert(hash.clone()),
                "hash collision for realistic configurations: {hash}"
            );
        }
    }

    #[test]
    fn test_edit_reconstruction_round_trip() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();
        selections.toggle(&product, "extras", "bacon").unwrap();
        selections.increment(&product, "toppings", "egg").unwrap();

        let customization = build_customization(&product, &selections, "extra crispy");
        let rebuilt = selections_for_edit(&product, &customization);

        assert_eq!(rebuilt, selections);
        // Re-confirming unchanged selections yields the same identity.
        let again = build_customization(&product, &rebuilt, "");
        assert_eq!(again.identity_hash(), customization.identity_hash());
    }

    #[test]
    fn test_edit_reconstruction_skips_unknown_references() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();
        selections.toggle(&product, "extras", "bacon").unwrap();
        let customization = build_customization(&product, &selections, "");

        // The store owner removed the bacon option and the whole size
        // group since the customization was saved.
        let mut changed = product.clone();
        changed.groups[1].options.retain(|o| o.id != "bacon");
        changed.groups.remove(0);

        let rebuilt = selections_for_edit(&changed, &customization);
        assert!(rebuilt.selection("size").is_none());
        assert_eq!(
            rebuilt.selection("extras"),
            Some(&SelectionValue::Multi(Vec::new()))
        );
    }

    #[test]
    fn test_wire_format() {
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "large").unwrap();

        let customization = build_customization(&product, &selections, "no pickles");
        let json = serde_json::to_value(&customization).unwrap();

        assert_eq!(json["_observations"], "no pickles");
        assert_eq!(json["groups"]["size"]["type"], "single-choice");
        assert_eq!(json["groups"]["size"]["selected"][0]["optionId"], "large");
        assert_eq!(json["groups"]["size"]["selected"][0]["priceCents"], 500);
        assert!(json["groups"]["size"]["selected"][0].get("quantity").is_none());
    }
}

//! # Validation Module
//!
//! Selection-rule validation for customization sessions, plus catalog
//! integrity checks.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront UI (TypeScript)                                   │
//! │  ├── Disables over-limit controls proactively                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (vitrine-core)                                   │
//! │  ├── validate(): required / min / max rules per group                  │
//! │  └── Reports a violation list; confirm is blocked while non-empty      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Catalog authoring (validate_catalog)                         │
//! │  ├── Unique group/option ids                                           │
//! │  └── Backward-only dependency and price matrix references              │
//! │                                                                         │
//! │  The engine only REPORTS. It never clamps or auto-fixes a selection.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Effective Requiredness
//! A group demands a selection when its `required` flag is set OR its
//! *effective* minimum is above zero. The second case is how a dependency
//! rule such as `{ "Large": { min 1 } }` turns an optional group into a
//! required one only while the parent selection matches; once the parent
//! changes back, the group's own static bounds decide again.

use std::collections::HashSet;

use crate::catalog::{GroupType, Product};
use crate::error::{CatalogError, CoreError, CoreResult, Violation};
use crate::rules;
use crate::selection::Selections;
use crate::{MAX_LINE_QUANTITY, MAX_OBSERVATIONS_LEN};

// =============================================================================
// Selection Validation
// =============================================================================

/// Validates the current selections against the product's groups,
/// group by group in group order.
///
/// ## Rules (per group)
/// - Required `single-choice` with nothing selected:
///   "Select one option in {group}"
/// - Required `multi-choice` below its minimum (at least 1 when the
///   `required` flag is set): "Select at least {min} in {group}"
/// - Required `quantity-choice`: same rule counting total quantity
/// - Any `multi-choice`/`quantity-choice` above its effective maximum,
///   required or not: "Maximum of {max} selections in {group}"
/// - A required dependent group whose parent has no selection yet:
///   "Select {parent} first for {group}", suppressed when another
///   violation was already recorded for the same group
///
/// The whole selection is valid iff the returned list is empty.
pub fn validate(product: &Product, selections: &Selections) -> Vec<Violation> {
    let mut violations = Vec::new();

    for group in &product.groups {
        let recorded_before = violations.len();
        let bounds = rules::effective_constraints(product, group, selections);
        let count = selections.selected_count(&group.id);
        let required = group.required || bounds.min_selections > 0;

        match group.group_type {
            GroupType::SingleChoice => {
                if required && count == 0 {
                    violations.push(Violation::SelectOne {
                        group_id: group.id.clone(),
                        group_name: group.name.clone(),
                    });
                }
            }
            GroupType::MultiChoice | GroupType::QuantityChoice => {
                if required {
                    let required_min = if group.required {
                        bounds.min_selections.max(1)
                    } else {
                        bounds.min_selections
                    };
                    if count < required_min {
                        violations.push(Violation::SelectAtLeast {
                            group_id: group.id.clone(),
                            group_name: group.name.clone(),
                            min: required_min,
                        });
                    }
                }
                // Possible despite the state machine's guards: edit-mode
                // seeds, or a parent change that shrank the bounds.
                if count > bounds.max_selections {
                    violations.push(Violation::MaxSelections {
                        group_id: group.id.clone(),
                        group_name: group.name.clone(),
                        max: bounds.max_selections,
                    });
                }
            }
        }

        // One message per group: the parent-first hint is only useful when
        // nothing more specific was reported above.
        if required && violations.len() == recorded_before {
            if let Some(dependency) = &group.depends_on {
                let parent_names = rules::parent_selected_names(
                    product,
                    dependency.parent_group_index,
                    selections,
                );
                if parent_names.is_empty() {
                    if let Some(parent) = product.groups.get(dependency.parent_group_index) {
                        violations.push(Violation::ParentFirst {
                            group_id: group.id.clone(),
                            group_name: group.name.clone(),
                            parent_name: parent.name.clone(),
                        });
                    }
                }
            }
        }
    }

    violations
}

// =============================================================================
// Catalog Validation
// =============================================================================

/// Checks a product definition for authoring mistakes.
///
/// ## Rules
/// - Group ids unique within the product
/// - Option ids unique within each group
/// - `min_selections <= max_selections`
/// - Dependencies and price matrices reference a group strictly earlier
///   in the group list (no forward or self references, hence no cycles)
pub fn validate_catalog(product: &Product) -> Result<(), CatalogError> {
    let mut group_ids = HashSet::new();

    for (index, group) in product.groups.iter().enumerate() {
        if !group_ids.insert(group.id.as_str()) {
            return Err(CatalogError::DuplicateGroupId {
                product_id: product.id.clone(),
                group_id: group.id.clone(),
            });
        }

        if group.min_selections > group.max_selections {
            return Err(CatalogError::InvertedBounds {
                group_id: group.id.clone(),
                min: group.min_selections,
                max: group.max_selections,
            });
        }

        if let Some(dependency) = &group.depends_on {
            if dependency.parent_group_index >= index {
                return Err(CatalogError::ForwardDependency {
                    group_id: group.id.clone(),
                    parent_index: dependency.parent_group_index,
                });
            }
        }

        let mut option_ids = HashSet::new();
        for option in &group.options {
            if !option_ids.insert(option.id.as_str()) {
                return Err(CatalogError::DuplicateOptionId {
                    group_id: group.id.clone(),
                    option_id: option.id.clone(),
                });
            }
            if let Some(matrix) = &option.price_matrix {
                if matrix.parent_group_index >= index {
                    return Err(CatalogError::ForwardPriceMatrix {
                        option_id: option.id.clone(),
                        parent_index: matrix.parent_group_index,
                    });
                }
            }
        }
    }

    Ok(())
}

// =============================================================================
// Scalar Validators
// =============================================================================

/// Validates a cart line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 {
        return Err(CoreError::InvalidQuantity {
            requested: quantity,
        });
    }

    if quantity > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the free-text observations attached to a customization.
///
/// ## Rules
/// - At most MAX_OBSERVATIONS_LEN (500) characters after trimming
/// - Empty is fine (observations are optional)
pub fn validate_observations(text: &str) -> CoreResult<()> {
    let len = text.trim().chars().count();
    if len > MAX_OBSERVATIONS_LEN {
        return Err(CoreError::ObservationsTooLong {
            len,
            max: MAX_OBSERVATIONS_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GroupDependency, GroupOption, OptionGroup, SelectionBounds};
    use std::collections::BTreeMap;

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

    /// The canonical customizable burger: required Size, optional Extras
    /// (max 2), Toppings by quantity (max 3), Sauce required only for
    /// Large.
    fn test_product() -> Product {
        let mut sauce_rules = BTreeMap::new();
        sauce_rules.insert("Large".to_string(), SelectionBounds::new(1, 1));

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
                        option("rings", "Onion Rings", 400),
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
                OptionGroup {
                    id: "sauce".to_string(),
                    name: "Sauce".to_string(),
                    required: false,
                    group_type: GroupType::MultiChoice,
                    min_selections: 0,
                    max_selections: 1,
                    options: vec![option("garlic", "Garlic", 0), option("bbq", "BBQ", 100)],
                    depends_on: Some(GroupDependency {
                        parent_group_index: 0,
                        rules: sauce_rules,
                    }),
                },
            ],
        }
    }

    #[test]
    fn test_missing_required_single_choice() {
        // Scenario: extras picked but no size chosen → exactly one
        // violation, and it references "Size".
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.toggle(&product, "extras", "bacon").unwrap();
        selections.toggle(&product, "extras", "cheddar").unwrap();

        let violations = validate(&product, &selections);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].group_name(), "Size");
        assert_eq!(violations[0].to_string(), "Select one option in Size");
    }

    #[test]
    fn test_no_required_groups_is_always_valid_empty() {
        let mut product = test_product();
        product.groups[0].required = false;

        let selections = Selections::empty_for(&product);
        assert!(validate(&product, &selections).is_empty());
    }

    #[test]
    fn test_dependency_makes_group_required() {
        // Scenario: Small → Sauce optional; Large → Sauce required min 1.
        let product = test_product();
        let mut selections = Selections::empty_for(&product);

        selections.select(&product, "size", "small").unwrap();
        assert!(validate(&product, &selections).is_empty());

        selections.select(&product, "size", "large").unwrap();
        let violations = validate(&product, &selections);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].to_string(), "Select at least 1 in Sauce");

        selections.toggle(&product, "sauce", "garlic").unwrap();
        assert!(validate(&product, &selections).is_empty());
    }

    #[test]
    fn test_static_min_reappears_when_parent_deselected() {
        // Boundary: static bounds demand a selection, a rule relaxes them
        // while the parent matches, and the demand reappears otherwise.
        let mut product = test_product();
        product.groups[3].min_selections = 1;
        let mut rules_map = BTreeMap::new();
        rules_map.insert("Small".to_string(), SelectionBounds::new(0, 1));
        product.groups[3].depends_on = Some(GroupDependency {
            parent_group_index: 0,
            rules: rules_map,
        });

        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "small").unwrap();
        assert!(validate(&product, &selections).is_empty());

        selections.select(&product, "size", "large").unwrap();
        let violations = validate(&product, &selections);
        assert!(violations
            .iter()
            .any(|v| v.to_string() == "Select at least 1 in Sauce"));
    }

    #[test]
    fn test_required_quantity_choice_counts_total() {
        let mut product = test_product();
        product.groups[2].required = true;

        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "small").unwrap();

        let violations = validate(&product, &selections);
        assert!(violations
            .iter()
            .any(|v| v.to_string() == "Select at least 1 in Toppings"));

        selections.increment(&product, "toppings", "olive").unwrap();
        assert!(validate(&product, &selections).is_empty());
    }

    #[test]
    fn test_over_max_reported_even_for_optional_group() {
        // The state machine prevents this path, but edit-mode seeds and
        // shrinking parent bounds can still produce it.
        let product = test_product();
        let mut selections = Selections::empty_for(&product);
        selections.select(&product, "size", "small").unwrap();
        selections.set_raw(
            "extras".to_string(),
            crate::selection::SelectionValue::Multi(vec![
                "bacon".to_string(),
                "cheddar".to_string(),
                "rings".to_string(),
            ]),
        );

        let violations = validate(&product, &selections);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "Maximum of 2 selections in Extras"
        );
    }

    #[test]
    fn test_parent_first_hint() {
        // A required dependent group that is otherwise satisfied still
        // needs its parent chosen before it can be trusted.
        let mut product = test_product();
        product.groups[3].required = true;

        let mut selections = Selections::empty_for(&product);
        selections.toggle(&product, "sauce", "garlic").unwrap();

        let violations = validate(&product, &selections);
        assert!(violations
            .iter()
            .any(|v| v.to_string() == "Select Size first for Sauce"));
    }

    #[test]
    fn test_parent_first_suppressed_by_other_violation() {
        // Same group must not accumulate contradictory messages.
        let mut product = test_product();
        product.groups[3].required = true;

        let selections = Selections::empty_for(&product);
        let violations = validate(&product, &selections);

        let sauce_messages: Vec<String> = violations
            .iter()
            .filter(|v| v.group_id() == "sauce")
            .map(|v| v.to_string())
            .collect();
        assert_eq!(sauce_messages, vec!["Select at least 1 in Sauce"]);
    }

    #[test]
    fn test_validate_catalog_accepts_well_formed_product() {
        assert!(validate_catalog(&test_product()).is_ok());
    }

    #[test]
    fn test_validate_catalog_rejects_forward_dependency() {
        let mut product = test_product();
        product.groups[0].depends_on = Some(GroupDependency {
            parent_group_index: 2,
            rules: BTreeMap::new(),
        });
        assert!(matches!(
            validate_catalog(&product),
            Err(CatalogError::ForwardDependency { .. })
        ));
    }

    #[test]
    fn test_validate_catalog_rejects_duplicates() {
        let mut product = test_product();
        product.groups[1].id = "size".to_string();
        assert!(matches!(
            validate_catalog(&product),
            Err(CatalogError::DuplicateGroupId { .. })
        ));

        let mut product = test_product();
        product.groups[1].options[1].id = "bacon".to_string();
        assert!(matches!(
            validate_catalog(&product),
            Err(CatalogError::DuplicateOptionId { .. })
        ));
    }

    #[test]
    fn test_validate_catalog_rejects_inverted_bounds() {
        let mut product = test_product();
        product.groups[1].min_selections = 5;
        assert!(matches!(
            validate_catalog(&product),
            Err(CatalogError::InvertedBounds { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_observations() {
        assert!(validate_observations("").is_ok());
        assert!(validate_observations("no onions, please").is_ok());
        assert!(validate_observations(&"a".repeat(500)).is_ok());
        assert!(validate_observations(&"a".repeat(501)).is_err());
        // Surrounding whitespace does not count against the limit.
        assert!(validate_observations(&format!("  {}  ", "a".repeat(500))).is_ok());
    }
}

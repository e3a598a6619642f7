//! Ingredient aggregation
//!
//! Totals the ingredients contributed by every product in a regimen.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Product, RegimenIngredient, RegimenProduct};
use super::outcome::{Issue, IssueKind, Outcome, RegimenError, RegimenResult};

/// Aggregated ingredients keyed by ingredient name
pub type IngredientTotals = BTreeMap<String, RegimenIngredient>;

/// Index products by id for lookups during aggregation and costing
pub(crate) fn index_products(products: &[Product]) -> HashMap<&str, &Product> {
    products.iter().map(|p| (p.id.as_str(), p)).collect()
}

/// Aggregate the ingredients of a regimen.
///
/// Each nutrition-fact line is scaled by the chosen amount and tagged with the
/// regimen product's frequency. Lines sharing a name are summed; a line that
/// cannot be combined is dropped and the earlier total kept.
pub fn aggregate_ingredients(
    regimen_products: &[RegimenProduct],
    products: &[Product],
) -> RegimenResult<Outcome<IngredientTotals>> {
    let by_id = index_products(products);
    let mut outcome = Outcome::clean(IngredientTotals::new());

    for regimen_product in regimen_products {
        let product = by_id
            .get(regimen_product.product_id.as_str())
            .ok_or_else(|| RegimenError::ProductNotFound(regimen_product.product_id.clone()))?;

        let Some(ref lines) = product.ingredients else {
            outcome.push(
                Issue::new(IssueKind::MissingNutritionFacts, "Product has no nutrition facts")
                    .for_product(&product.id),
            );
            continue;
        };

        for line in lines {
            let contribution = RegimenIngredient {
                ingredient_type: line.ingredient_type.clone(),
                quantity: line.quantity.scale(regimen_product.quantity.amount),
                frequency: regimen_product.quantity.frequency,
            };

            let merged = match outcome.value.get(contribution.name()) {
                None => Some(contribution),
                Some(existing) => {
                    let sum = sum_regimen_ingredients(existing, &contribution)?;
                    outcome.absorb(sum)
                }
            };

            if let Some(total) = merged {
                outcome.value.insert(total.name().to_string(), total);
            }
        }
    }

    Ok(outcome)
}

/// Sum two contributions of the same ingredient.
///
/// `None` when units or frequencies differ; a differing name is caller misuse.
pub fn sum_regimen_ingredients(
    a: &RegimenIngredient,
    b: &RegimenIngredient,
) -> RegimenResult<Outcome<Option<RegimenIngredient>>> {
    if a.name() != b.name() {
        return Err(RegimenError::IngredientTypeMismatch {
            expected: a.name().to_string(),
            found: b.name().to_string(),
        });
    }

    let mut outcome = Outcome::clean(None);

    if a.quantity.units != b.quantity.units {
        outcome.push(
            Issue::new(
                IssueKind::UnitMismatch,
                format!(
                    "Cannot add {} to {}; unit conversions unsupported",
                    b.quantity.units.as_str(),
                    a.quantity.units.as_str()
                ),
            )
            .for_ingredient(a.name()),
        );
        return Ok(outcome);
    }

    if a.frequency != b.frequency {
        outcome.push(
            Issue::new(
                IssueKind::FrequencyMismatch,
                format!(
                    "Cannot add {} to {}; frequency conversions unsupported",
                    b.frequency.as_str(),
                    a.frequency.as_str()
                ),
            )
            .for_ingredient(a.name()),
        );
        return Ok(outcome);
    }

    outcome.value = Some(a.with_amount(a.quantity.amount + b.quantity.amount));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Frequency, IngredientQuantity, IngredientType, IngredientUnits, ProductIngredient,
        ProductQuantity, ProductUnits,
    };

    fn product(id: &str, lines: &[(&str, f64, IngredientUnits)]) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            unit_price: 1.0,
            ingredients: Some(
                lines
                    .iter()
                    .map(|(name, amount, units)| ProductIngredient {
                        ingredient_type: IngredientType::new(*name, *units),
                        quantity: IngredientQuantity::new(*amount, *units),
                    })
                    .collect(),
            ),
        }
    }

    fn take(id: &str, amount: f64, frequency: Frequency) -> RegimenProduct {
        RegimenProduct::new(
            id,
            ProductQuantity {
                amount,
                units: ProductUnits::Servings,
                frequency,
            },
        )
    }

    fn amount_of(totals: &IngredientTotals, name: &str) -> f64 {
        totals[name].quantity.amount
    }

    #[test]
    fn test_calcium_from_two_products() {
        let products = vec![
            product("a", &[("Calcium", 50.0, IngredientUnits::Mg)]),
            product("b", &[("Calcium", 30.0, IngredientUnits::Mg)]),
        ];
        let regimen = vec![take("a", 1.0, Frequency::Daily), take("b", 1.0, Frequency::Daily)];

        let outcome = aggregate_ingredients(&regimen, &products).unwrap();
        assert!(outcome.is_clean());
        assert_eq!(outcome.value.len(), 1);
        let calcium = &outcome.value["Calcium"];
        assert_eq!(calcium.quantity, IngredientQuantity::new(80.0, IngredientUnits::Mg));
        assert_eq!(calcium.frequency, Frequency::Daily);
    }

    #[test]
    fn test_scaling_is_linear() {
        let products = vec![product("a", &[("Zinc", 8.0, IngredientUnits::Mg), ("Iron", 18.0, IngredientUnits::Mg)])];

        let single = aggregate_ingredients(&[take("a", 1.5, Frequency::Daily)], &products).unwrap();
        let double = aggregate_ingredients(&[take("a", 3.0, Frequency::Daily)], &products).unwrap();

        for name in ["Zinc", "Iron"] {
            assert!((amount_of(&double.value, name) - 2.0 * amount_of(&single.value, name)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_disjoint_products_union() {
        let products = vec![
            product("a", &[("Zinc", 8.0, IngredientUnits::Mg)]),
            product("b", &[("Biotin", 300.0, IngredientUnits::Mcg)]),
        ];
        let a = aggregate_ingredients(&[take("a", 2.0, Frequency::Daily)], &products).unwrap().value;
        let b = aggregate_ingredients(&[take("b", 1.0, Frequency::Daily)], &products).unwrap().value;
        let both = aggregate_ingredients(
            &[take("a", 2.0, Frequency::Daily), take("b", 1.0, Frequency::Daily)],
            &products,
        )
        .unwrap()
        .value;

        let mut union = a;
        union.extend(b);
        assert_eq!(both, union);
    }

    #[test]
    fn test_order_independent() {
        let products = vec![
            product("a", &[("Calcium", 500.0, IngredientUnits::Mg), ("D3", 1000.0, IngredientUnits::Iu)]),
            product("b", &[("Calcium", 250.0, IngredientUnits::Mg)]),
            product("c", &[("D3", 400.0, IngredientUnits::Iu), ("Zinc", 15.0, IngredientUnits::Mg)]),
        ];
        let forward = vec![
            take("a", 2.0, Frequency::Daily),
            take("b", 1.0, Frequency::Daily),
            take("c", 3.0, Frequency::Daily),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let x = aggregate_ingredients(&forward, &products).unwrap().value;
        let y = aggregate_ingredients(&reversed, &products).unwrap().value;
        assert_eq!(x, y);
        assert_eq!(amount_of(&x, "Calcium"), 1250.0);
        assert_eq!(amount_of(&x, "D3"), 3200.0);
    }

    #[test]
    fn test_unit_mismatch_keeps_first_contribution() {
        let products = vec![
            product("a", &[("B12", 1.0, IngredientUnits::Mg)]),
            product("b", &[("B12", 500.0, IngredientUnits::Mcg)]),
        ];
        let regimen = vec![take("a", 1.0, Frequency::Daily), take("b", 1.0, Frequency::Daily)];

        let outcome = aggregate_ingredients(&regimen, &products).unwrap();
        assert!(outcome.has(IssueKind::UnitMismatch));
        assert_eq!(outcome.value["B12"].quantity, IngredientQuantity::new(1.0, IngredientUnits::Mg));
    }

    #[test]
    fn test_frequency_mismatch_keeps_first_contribution() {
        let products = vec![
            product("a", &[("Zinc", 10.0, IngredientUnits::Mg)]),
            product("b", &[("Zinc", 50.0, IngredientUnits::Mg)]),
        ];
        let regimen = vec![take("a", 1.0, Frequency::Daily), take("b", 1.0, Frequency::Weekly)];

        let outcome = aggregate_ingredients(&regimen, &products).unwrap();
        assert!(outcome.has(IssueKind::FrequencyMismatch));
        assert_eq!(amount_of(&outcome.value, "Zinc"), 10.0);
        assert_eq!(outcome.value["Zinc"].frequency, Frequency::Daily);
    }

    #[test]
    fn test_missing_product_is_an_error() {
        let err = aggregate_ingredients(&[take("ghost", 1.0, Frequency::Daily)], &[]).unwrap_err();
        assert_eq!(err, RegimenError::ProductNotFound("ghost".to_string()));
    }

    #[test]
    fn test_product_without_facts_is_skipped() {
        let mut bare = product("bare", &[]);
        bare.ingredients = None;
        let products = vec![bare, product("a", &[("Zinc", 10.0, IngredientUnits::Mg)])];
        let regimen = vec![take("bare", 1.0, Frequency::Daily), take("a", 1.0, Frequency::Daily)];

        let outcome = aggregate_ingredients(&regimen, &products).unwrap();
        assert!(outcome.has(IssueKind::MissingNutritionFacts));
        assert_eq!(outcome.issues[0].product_id.as_deref(), Some("bare"));
        assert_eq!(amount_of(&outcome.value, "Zinc"), 10.0);
    }

    #[test]
    fn test_sum_rejects_different_ingredients() {
        let zinc = RegimenIngredient {
            ingredient_type: IngredientType::new("Zinc", IngredientUnits::Mg),
            quantity: IngredientQuantity::new(1.0, IngredientUnits::Mg),
            frequency: Frequency::Daily,
        };
        let iron = RegimenIngredient {
            ingredient_type: IngredientType::new("Iron", IngredientUnits::Mg),
            ..zinc.clone()
        };
        assert!(matches!(
            sum_regimen_ingredients(&zinc, &iron),
            Err(RegimenError::IngredientTypeMismatch { .. })
        ));
    }
}

//! Cost projection
//!
//! Money for ingredients, for regimen products, and sums of costs. All
//! operands must share one frequency; the first operand sets it.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{Cost, Frequency, IngredientPrice, Product, ProductQuantity, RegimenIngredient, RegimenProduct};
use super::aggregate::index_products;
use super::outcome::{Issue, IssueKind, Outcome, RegimenError, RegimenResult};

/// Ingredient prices keyed by ingredient name
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: HashMap<String, IngredientPrice>,
}

impl PriceBook {
    pub fn new(prices: impl IntoIterator<Item = IngredientPrice>) -> Self {
        Self {
            prices: prices
                .into_iter()
                .map(|p| (p.ingredient_name.clone(), p))
                .collect(),
        }
    }

    pub fn get(&self, ingredient_name: &str) -> Option<&IngredientPrice> {
        self.prices.get(ingredient_name)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Cost of buying the given ingredient amounts at list price.
///
/// Ingredients on another frequency than the first, without a price, or priced
/// in other units are left out.
pub fn project_ingredient_cost(ingredients: &[RegimenIngredient], prices: &PriceBook) -> Outcome<Cost> {
    let frequency = ingredients.first().map(|i| i.frequency).unwrap_or_default();
    let mut outcome = Outcome::clean(Cost::zero(frequency));

    for ingredient in ingredients {
        if ingredient.frequency != frequency {
            outcome.push(
                Issue::new(
                    IssueKind::FrequencyMismatch,
                    format!(
                        "Expected {} but found {}; frequency conversions unsupported",
                        frequency.as_str(),
                        ingredient.frequency.as_str()
                    ),
                )
                .for_ingredient(ingredient.name()),
            );
            continue;
        }

        let Some(price) = prices.get(ingredient.name()) else {
            outcome.push(
                Issue::new(IssueKind::MissingPrice, "No price for ingredient")
                    .for_ingredient(ingredient.name()),
            );
            continue;
        };

        if price.units != ingredient.quantity.units {
            outcome.push(
                Issue::new(
                    IssueKind::UnitMismatch,
                    format!(
                        "Priced per {} but amount is in {}; unit conversions unsupported",
                        price.units.as_str(),
                        ingredient.quantity.units.as_str()
                    ),
                )
                .for_ingredient(ingredient.name()),
            );
            continue;
        }

        outcome.value.money += price.price * ingredient.quantity.amount;
    }

    outcome
}

/// Cost of taking `quantity` of a product
pub fn product_cost(product: &Product, quantity: &ProductQuantity) -> Cost {
    Cost::new(product.unit_price * quantity.amount, quantity.frequency)
}

/// Cost of every product in the regimen, on the first product's frequency
pub fn project_product_cost(
    regimen_products: &[RegimenProduct],
    products: &[Product],
) -> RegimenResult<Outcome<Cost>> {
    let by_id = index_products(products);
    let frequency = regimen_products
        .first()
        .map(|p| p.quantity.frequency)
        .unwrap_or_default();
    let mut outcome = Outcome::clean(Cost::zero(frequency));

    for regimen_product in regimen_products {
        let product = by_id
            .get(regimen_product.product_id.as_str())
            .ok_or_else(|| RegimenError::ProductNotFound(regimen_product.product_id.clone()))?;

        let cost = product_cost(product, &regimen_product.quantity);
        if cost.frequency != frequency {
            outcome.push(
                Issue::new(
                    IssueKind::FrequencyMismatch,
                    format!(
                        "Expected {} but found {}; frequency conversions unsupported",
                        frequency.as_str(),
                        cost.frequency.as_str()
                    ),
                )
                .for_product(&product.id),
            );
            continue;
        }

        outcome.value.money += cost.money;
    }

    Ok(outcome)
}

/// Left fold of costs on the first cost's frequency.
///
/// A cost on any other frequency is excluded rather than added as-is.
pub fn sum_costs(costs: &[Cost]) -> Outcome<Cost> {
    let frequency = costs.first().map(|c| c.frequency).unwrap_or(Frequency::Daily);

    costs.iter().fold(Outcome::clean(Cost::zero(frequency)), |mut acc, cost| {
        if cost.frequency == frequency {
            acc.value.money += cost.money;
        } else {
            acc.push(Issue::new(
                IssueKind::FrequencyMismatch,
                format!(
                    "Cannot add a {} cost to a {} total; frequency conversions unsupported",
                    cost.frequency.as_str(),
                    frequency.as_str()
                ),
            ));
        }
        acc
    })
}

/// Sort cheapest first. Costs on different frequencies compare equal, so their
/// relative order is kept.
pub fn sort_by_cost<T>(items: &mut [(T, Cost)]) {
    items.sort_by(|(_, a), (_, b)| {
        if a.frequency != b.frequency {
            return Ordering::Equal;
        }
        a.money.partial_cmp(&b.money).unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IngredientQuantity, IngredientType, IngredientUnits, ProductUnits};

    fn ingredient(name: &str, amount: f64, units: IngredientUnits, frequency: Frequency) -> RegimenIngredient {
        RegimenIngredient {
            ingredient_type: IngredientType::new(name, units),
            quantity: IngredientQuantity::new(amount, units),
            frequency,
        }
    }

    fn price(name: &str, price: f64, units: IngredientUnits) -> IngredientPrice {
        IngredientPrice {
            ingredient_name: name.to_string(),
            price,
            units,
        }
    }

    fn product(id: &str, unit_price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            brand: None,
            unit_price,
            ingredients: Some(Vec::new()),
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

    #[test]
    fn test_ingredient_cost_sums_priced_amounts() {
        let prices = PriceBook::new(vec![
            price("Calcium", 0.001, IngredientUnits::Mg),
            price("D3", 0.0002, IngredientUnits::Iu),
        ]);
        let out = project_ingredient_cost(
            &[
                ingredient("Calcium", 700.0, IngredientUnits::Mg, Frequency::Daily),
                ingredient("D3", 2000.0, IngredientUnits::Iu, Frequency::Daily),
            ],
            &prices,
        );
        assert!(out.is_clean());
        assert!((out.value.money - 1.1).abs() < 1e-9);
        assert_eq!(out.value.frequency, Frequency::Daily);
    }

    #[test]
    fn test_missing_price_excluded() {
        let prices = PriceBook::new(vec![price("Calcium", 0.001, IngredientUnits::Mg)]);
        let with_zinc = project_ingredient_cost(
            &[
                ingredient("Calcium", 500.0, IngredientUnits::Mg, Frequency::Daily),
                ingredient("Zinc", 15.0, IngredientUnits::Mg, Frequency::Daily),
            ],
            &prices,
        );
        let without_zinc = project_ingredient_cost(
            &[ingredient("Calcium", 500.0, IngredientUnits::Mg, Frequency::Daily)],
            &prices,
        );

        assert_eq!(with_zinc.value, without_zinc.value);
        assert!(with_zinc.has(IssueKind::MissingPrice));
        assert_eq!(with_zinc.issues[0].ingredient.as_deref(), Some("Zinc"));
    }

    #[test]
    fn test_ingredient_cost_skips_other_frequency_and_units() {
        let prices = PriceBook::new(vec![
            price("Calcium", 0.001, IngredientUnits::Mg),
            price("B12", 0.01, IngredientUnits::Mcg),
        ]);
        let out = project_ingredient_cost(
            &[
                ingredient("Calcium", 1000.0, IngredientUnits::Mg, Frequency::Monthly),
                ingredient("Calcium", 1000.0, IngredientUnits::Mg, Frequency::Daily),
                ingredient("B12", 1.0, IngredientUnits::Mg, Frequency::Monthly),
            ],
            &prices,
        );
        assert_eq!(out.value, Cost::new(1.0, Frequency::Monthly));
        assert!(out.has(IssueKind::FrequencyMismatch));
        assert!(out.has(IssueKind::UnitMismatch));
    }

    #[test]
    fn test_empty_ingredients_cost_nothing_daily() {
        let out = project_ingredient_cost(&[], &PriceBook::default());
        assert_eq!(out.value, Cost::zero(Frequency::Daily));
    }

    #[test]
    fn test_product_cost_on_first_frequency() {
        let products = vec![product("a", 0.5), product("b", 2.0), product("c", 9.0)];
        let out = project_product_cost(
            &[
                take("a", 4.0, Frequency::Daily),
                take("b", 1.0, Frequency::Daily),
                take("c", 1.0, Frequency::Monthly),
            ],
            &products,
        )
        .unwrap();
        assert_eq!(out.value, Cost::new(4.0, Frequency::Daily));
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.issues[0].product_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_product_cost_unknown_product() {
        let err = project_product_cost(&[take("ghost", 1.0, Frequency::Daily)], &[]).unwrap_err();
        assert_eq!(err, RegimenError::ProductNotFound("ghost".to_string()));
    }

    #[test]
    fn test_sum_single_cost_is_identity() {
        let cost = Cost::new(50.4, Frequency::Monthly);
        let out = sum_costs(&[cost]);
        assert_eq!(out.value, cost);
        assert!(out.is_clean());
    }

    #[test]
    fn test_sum_excludes_mismatched_frequency() {
        let out = sum_costs(&[
            Cost::new(1.0, Frequency::Daily),
            Cost::new(30.0, Frequency::Monthly),
            Cost::new(2.0, Frequency::Daily),
        ]);
        assert_eq!(out.value, Cost::new(3.0, Frequency::Daily));
        assert!(out.has(IssueKind::FrequencyMismatch));
    }

    #[test]
    fn test_sum_of_nothing() {
        assert_eq!(sum_costs(&[]).value, Cost::zero(Frequency::Daily));
    }

    #[test]
    fn test_sort_by_cost() {
        let mut items = vec![
            ("b", Cost::new(2.0, Frequency::Daily)),
            ("a", Cost::new(1.0, Frequency::Daily)),
            ("c", Cost::new(3.0, Frequency::Daily)),
        ];
        sort_by_cost(&mut items);
        let order: Vec<_> = items.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }
}

//! Projected regimen cost
//!
//! What the regimen would cost per period if a candidate product were added
//! and every goal still unmet afterwards were bought as raw ingredients.

use serde::Serialize;

use crate::models::{Cost, IngredientRange, Product, ProductQuantity, RegimenIngredient, RegimenProduct};
use super::aggregate::aggregate_ingredients;
use super::cost::{product_cost, project_ingredient_cost, project_product_cost, sum_costs, PriceBook};
use super::gaps::{ingredient_gaps, subtract_product};
use super::outcome::{Outcome, RegimenResult};

/// Everything a projection reads
#[derive(Debug, Clone, Copy)]
pub struct ProjectionInput<'a> {
    pub regimen_products: &'a [RegimenProduct],
    pub products: &'a [Product],
    pub ranges: &'a [IngredientRange],
    pub prices: &'a PriceBook,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedRegimenCost {
    pub cost: Cost,
    pub remaining_ingredients: usize,
    pub remaining: Vec<RegimenIngredient>,
}

/// Project the regimen cost with one serving a day of `candidate` added
pub fn project_regimen_with(
    candidate: &Product,
    input: &ProjectionInput<'_>,
) -> RegimenResult<Outcome<ProjectedRegimenCost>> {
    let mut outcome = Outcome::clean(());

    let totals = outcome.absorb(aggregate_ingredients(input.regimen_products, input.products)?);
    let gaps = outcome.absorb(ingredient_gaps(input.ranges, &totals)?);

    let serving = ProductQuantity::default();
    let remaining: Vec<RegimenIngredient> = outcome
        .absorb(subtract_product(&gaps, candidate, serving.frequency))
        .into_iter()
        .filter(|i| i.quantity.amount > 0.0)
        .collect();

    let regimen_cost = outcome.absorb(project_product_cost(input.regimen_products, input.products)?);
    let candidate_cost = product_cost(candidate, &serving);
    let remaining_cost = outcome.absorb(project_ingredient_cost(&remaining, input.prices));

    // An empty regimen would otherwise pin the total to its default frequency
    let costs = if input.regimen_products.is_empty() {
        vec![candidate_cost, remaining_cost]
    } else {
        vec![regimen_cost, candidate_cost, remaining_cost]
    };
    let cost = outcome.absorb(sum_costs(&costs));

    tracing::debug!(
        product_id = %candidate.id,
        money = cost.money,
        remaining = remaining.len(),
        "Projected regimen cost"
    );

    Ok(outcome.map(|()| ProjectedRegimenCost {
        cost,
        remaining_ingredients: remaining.len(),
        remaining,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Frequency, IngredientPrice, IngredientQuantity, IngredientType, IngredientUnits,
        ProductIngredient,
    };
    use crate::regimen::IssueKind;

    fn line(name: &str, amount: f64, units: IngredientUnits) -> ProductIngredient {
        ProductIngredient {
            ingredient_type: IngredientType::new(name, units),
            quantity: IngredientQuantity::new(amount, units),
        }
    }

    fn goal(name: &str, minimum: f64, units: IngredientUnits) -> IngredientRange {
        IngredientRange {
            ingredient_type: IngredientType::new(name, units),
            minimum: Some(IngredientQuantity::new(minimum, units)),
            maximum: None,
            units,
            frequency: Frequency::Daily,
        }
    }

    fn fixtures() -> (Vec<Product>, Vec<IngredientRange>, PriceBook) {
        let products = vec![
            Product {
                id: "multi".to_string(),
                name: "Multivitamin".to_string(),
                brand: None,
                unit_price: 0.5,
                ingredients: Some(vec![line("Calcium", 200.0, IngredientUnits::Mg), line("Zinc", 15.0, IngredientUnits::Mg)]),
            },
            Product {
                id: "cal".to_string(),
                name: "Calcium Chew".to_string(),
                brand: None,
                unit_price: 0.25,
                ingredients: Some(vec![line("Calcium", 500.0, IngredientUnits::Mg)]),
            },
        ];
        let ranges = vec![
            goal("Calcium", 1200.0, IngredientUnits::Mg),
            goal("Zinc", 15.0, IngredientUnits::Mg),
            goal("B12", 350.0, IngredientUnits::Mcg),
        ];
        let prices = PriceBook::new(vec![
            IngredientPrice {
                ingredient_name: "Calcium".to_string(),
                price: 0.001,
                units: IngredientUnits::Mg,
            },
            IngredientPrice {
                ingredient_name: "B12".to_string(),
                price: 0.002,
                units: IngredientUnits::Mcg,
            },
        ]);
        (products, ranges, prices)
    }

    #[test]
    fn test_projection_with_candidate() {
        let (products, ranges, prices) = fixtures();
        let regimen = vec![RegimenProduct::new("multi", ProductQuantity::default())];
        let input = ProjectionInput {
            regimen_products: &regimen,
            products: &products,
            ranges: &ranges,
            prices: &prices,
        };

        let out = project_regimen_with(&products[1], &input).unwrap();
        assert!(out.is_clean());

        // Calcium 1200 - 200 - 500 = 500mg, B12 350mcg; zinc is met
        let projected = out.value;
        assert_eq!(projected.remaining_ingredients, 2);
        let expected = 0.5 + 0.25 + 500.0 * 0.001 + 350.0 * 0.002;
        assert!((projected.cost.money - expected).abs() < 1e-9);
        assert_eq!(projected.cost.frequency, Frequency::Daily);
    }

    #[test]
    fn test_projection_on_empty_regimen() {
        let (products, ranges, prices) = fixtures();
        let input = ProjectionInput {
            regimen_products: &[],
            products: &products,
            ranges: &ranges,
            prices: &prices,
        };

        let out = project_regimen_with(&products[0], &input).unwrap();
        // Calcium 1000mg and B12 350mcg remain; zinc is covered by the candidate
        assert_eq!(out.value.remaining_ingredients, 2);
        let expected = 0.5 + 1000.0 * 0.001 + 350.0 * 0.002;
        assert!((out.value.cost.money - expected).abs() < 1e-9);
    }

    #[test]
    fn test_projection_reports_missing_prices() {
        let (products, mut ranges, prices) = fixtures();
        ranges.push(goal("Magnesium", 400.0, IngredientUnits::Mg));
        let input = ProjectionInput {
            regimen_products: &[],
            products: &products,
            ranges: &ranges,
            prices: &prices,
        };

        let out = project_regimen_with(&products[1], &input).unwrap();
        assert!(out.has(IssueKind::MissingPrice));
    }

    #[test]
    fn test_daily_serving_does_not_cover_weekly_goal() {
        let (products, _, prices) = fixtures();
        let mut weekly = goal("Calcium", 1200.0, IngredientUnits::Mg);
        weekly.frequency = Frequency::Weekly;
        let ranges = vec![weekly];
        let input = ProjectionInput {
            regimen_products: &[],
            products: &products,
            ranges: &ranges,
            prices: &prices,
        };

        let out = project_regimen_with(&products[1], &input).unwrap();
        assert_eq!(out.value.remaining.len(), 1);
        assert_eq!(out.value.remaining[0].quantity.amount, 1200.0);
        assert_eq!(out.value.remaining[0].frequency, Frequency::Weekly);
        assert!(out
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::FrequencyMismatch && i.product_id.as_deref() == Some("cal")));
    }
}

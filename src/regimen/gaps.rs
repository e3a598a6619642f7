//! Goal gaps
//!
//! What each goal range still needs once the regimen's totals are counted.

use std::collections::HashMap;

use crate::models::{Frequency, IngredientQuantity, IngredientRange, Product, RegimenIngredient};
use super::aggregate::IngredientTotals;
use super::outcome::{Issue, IssueKind, Outcome, RegimenError, RegimenResult};

/// Remaining amount per goal, omitting goals already met.
///
/// An ingredient the regimen does not contain counts as zero. Ranges that
/// cannot be compared (units or frequency differ) are skipped.
pub fn ingredient_gaps(
    ranges: &[IngredientRange],
    totals: &IngredientTotals,
) -> RegimenResult<Outcome<Vec<RegimenIngredient>>> {
    let mut outcome = Outcome::clean(Vec::new());

    for range in ranges {
        let realized = match totals.get(range.name()) {
            Some(found) => found.clone(),
            None => RegimenIngredient {
                ingredient_type: range.ingredient_type.clone(),
                quantity: IngredientQuantity::zero(range.units),
                frequency: range.frequency,
            },
        };

        let gap = subtract_from_minimum(range, &realized)?;
        if let Some(gap) = outcome.absorb(gap) {
            if gap.quantity.amount > 0.0 {
                outcome.value.push(gap);
            }
        }
    }

    Ok(outcome)
}

/// `minimum - realized` for one range, minimum defaulting to zero.
///
/// `None` when the pair cannot be compared. The result may be zero or negative.
pub fn subtract_from_minimum(
    range: &IngredientRange,
    realized: &RegimenIngredient,
) -> RegimenResult<Outcome<Option<RegimenIngredient>>> {
    if range.name() != realized.name() {
        return Err(RegimenError::IngredientTypeMismatch {
            expected: range.name().to_string(),
            found: realized.name().to_string(),
        });
    }

    let mut outcome = Outcome::clean(None);

    if range.frequency != realized.frequency {
        outcome.push(
            Issue::new(
                IssueKind::FrequencyMismatch,
                format!(
                    "Goal is {} but regimen provides it {}; frequency conversions unsupported",
                    range.frequency.as_str(),
                    realized.frequency.as_str()
                ),
            )
            .for_ingredient(range.name()),
        );
        return Ok(outcome);
    }

    if let Some(minimum) = range.minimum {
        if minimum.units != realized.quantity.units {
            outcome.push(
                Issue::new(
                    IssueKind::UnitMismatch,
                    format!(
                        "Goal is in {} but regimen provides {}; unit conversions unsupported",
                        minimum.units.as_str(),
                        realized.quantity.units.as_str()
                    ),
                )
                .for_ingredient(range.name()),
            );
            return Ok(outcome);
        }
    }

    let minimum_amount = range.minimum.map(|m| m.amount).unwrap_or(0.0);
    outcome.value = Some(realized.with_amount(minimum_amount - realized.quantity.amount));
    Ok(outcome)
}

/// Subtract one serving of `product`, taken at `frequency`, from the remaining
/// ingredients.
///
/// Entries the product does not contain pass through unchanged, as do entries
/// on another frequency or whose units differ from the product's line.
pub fn subtract_product(
    remaining: &[RegimenIngredient],
    product: &Product,
    frequency: Frequency,
) -> Outcome<Vec<RegimenIngredient>> {
    let Some(ref lines) = product.ingredients else {
        let mut outcome = Outcome::clean(Vec::new());
        outcome.push(
            Issue::new(IssueKind::MissingNutritionFacts, "Product has no nutrition facts")
                .for_product(&product.id),
        );
        return outcome;
    };

    let by_name: HashMap<&str, &IngredientQuantity> = lines
        .iter()
        .map(|line| (line.ingredient_type.name.as_str(), &line.quantity))
        .collect();

    let mut outcome = Outcome::clean(Vec::with_capacity(remaining.len()));
    for entry in remaining {
        let next = match by_name.get(entry.name()) {
            Some(_) if entry.frequency != frequency => {
                outcome.push(
                    Issue::new(
                        IssueKind::FrequencyMismatch,
                        format!(
                            "Product is taken {} but {} is needed {}; frequency conversions unsupported",
                            frequency.as_str(),
                            entry.name(),
                            entry.frequency.as_str()
                        ),
                    )
                    .for_ingredient(entry.name())
                    .for_product(&product.id),
                );
                entry.clone()
            }
            Some(provided) if provided.units == entry.quantity.units => {
                entry.with_amount(entry.quantity.amount - provided.amount)
            }
            Some(provided) => {
                outcome.push(
                    Issue::new(
                        IssueKind::UnitMismatch,
                        format!(
                            "Product provides {} but {} is needed; unit conversions unsupported",
                            provided.units.as_str(),
                            entry.quantity.units.as_str()
                        ),
                    )
                    .for_ingredient(entry.name())
                    .for_product(&product.id),
                );
                entry.clone()
            }
            None => entry.clone(),
        };
        outcome.value.push(next);
    }

    outcome
}

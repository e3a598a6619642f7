//! Regimen calculations
//!
//! Pure functions over already-loaded catalog, regimen and goal records:
//! ingredient aggregation, goal gaps, and cost projection.

pub mod aggregate;
pub mod cost;
pub mod gaps;
pub mod outcome;
pub mod projection;

pub use aggregate::{aggregate_ingredients, sum_regimen_ingredients, IngredientTotals};
pub use cost::{
    product_cost, project_ingredient_cost, project_product_cost, sort_by_cost, sum_costs, PriceBook,
};
pub use gaps::{ingredient_gaps, subtract_from_minimum, subtract_product};
pub use outcome::{Issue, IssueKind, Outcome, RegimenError, RegimenResult};
pub use projection::{project_regimen_with, ProjectedRegimenCost, ProjectionInput};

//! Analysis tools
//!
//! Load the stored catalog, regimen and goals, then run the calculations.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Cost, IngredientPrice, IngredientRange, Product, RegimenIngredient, RegimenProduct,
};
use crate::regimen::{
    aggregate_ingredients, ingredient_gaps, project_ingredient_cost, project_product_cost,
    project_regimen_with, sum_costs, Issue, Outcome, PriceBook, ProjectedRegimenCost,
    ProjectionInput,
};

/// Everything the calculations read, loaded in one go
pub(crate) struct Snapshot {
    products: Vec<Product>,
    regimen: Vec<RegimenProduct>,
    ranges: Vec<IngredientRange>,
    prices: PriceBook,
}

impl Snapshot {
    pub(crate) fn load(db: &Database) -> Result<Self, String> {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

        let products = Product::list(&conn).map_err(|e| format!("Failed to load products: {}", e))?;
        let regimen = RegimenProduct::list(&conn).map_err(|e| format!("Failed to load regimen: {}", e))?;
        let ranges = IngredientRange::list(&conn).map_err(|e| format!("Failed to load goals: {}", e))?;
        let prices = IngredientPrice::list(&conn).map_err(|e| format!("Failed to load prices: {}", e))?;

        Ok(Self {
            products,
            regimen,
            ranges,
            prices: PriceBook::new(prices),
        })
    }

    fn gaps(&self) -> Result<Outcome<Vec<RegimenIngredient>>, String> {
        let mut outcome = Outcome::clean(());
        let totals = outcome.absorb(
            aggregate_ingredients(&self.regimen, &self.products).map_err(|e| e.to_string())?,
        );
        let gaps = outcome.absorb(ingredient_gaps(&self.ranges, &totals).map_err(|e| e.to_string())?);
        Ok(outcome.map(|()| gaps))
    }

    pub(crate) fn project(&self, candidate: &Product) -> Result<Outcome<ProjectedRegimenCost>, String> {
        let input = ProjectionInput {
            regimen_products: &self.regimen,
            products: &self.products,
            ranges: &self.ranges,
            prices: &self.prices,
        };
        project_regimen_with(candidate, &input).map_err(|e| e.to_string())
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Serialize)]
pub struct RegimenIngredientsResponse {
    pub ingredients: Vec<RegimenIngredient>,
    pub issues: Vec<Issue>,
    pub as_of: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientGapsResponse {
    pub gaps: Vec<RegimenIngredient>,
    pub issues: Vec<Issue>,
    pub as_of: String,
}

#[derive(Debug, Serialize)]
pub struct RegimenCostResponse {
    /// What the selected products cost
    pub products_cost: Cost,
    /// What buying the unmet goals as raw ingredients would cost
    pub remaining_cost: Cost,
    pub total: Cost,
    pub remaining: Vec<RegimenIngredient>,
    pub issues: Vec<Issue>,
    pub as_of: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectedCostResponse {
    pub product_id: String,
    #[serde(flatten)]
    pub projection: ProjectedRegimenCost,
    pub issues: Vec<Issue>,
    pub as_of: String,
}

/// Aggregated ingredient totals of the current regimen
pub fn regimen_ingredients(db: &Database) -> Result<RegimenIngredientsResponse, String> {
    let snapshot = Snapshot::load(db)?;
    let outcome = aggregate_ingredients(&snapshot.regimen, &snapshot.products).map_err(|e| e.to_string())?;

    Ok(RegimenIngredientsResponse {
        ingredients: outcome.value.into_values().collect(),
        issues: outcome.issues,
        as_of: now(),
    })
}

/// Remaining amount per unmet goal
pub fn ingredient_gaps_report(db: &Database) -> Result<IngredientGapsResponse, String> {
    let snapshot = Snapshot::load(db)?;
    let outcome = snapshot.gaps()?;

    Ok(IngredientGapsResponse {
        gaps: outcome.value,
        issues: outcome.issues,
        as_of: now(),
    })
}

/// Current regimen cost plus the cost of the ingredients it still lacks
pub fn regimen_cost(db: &Database) -> Result<RegimenCostResponse, String> {
    let snapshot = Snapshot::load(db)?;
    let mut outcome = Outcome::clean(());

    let remaining = outcome.absorb(snapshot.gaps()?);
    let products_cost = outcome.absorb(
        project_product_cost(&snapshot.regimen, &snapshot.products).map_err(|e| e.to_string())?,
    );
    let remaining_cost = outcome.absorb(project_ingredient_cost(&remaining, &snapshot.prices));

    let costs = match (snapshot.regimen.is_empty(), remaining.is_empty()) {
        (true, _) => vec![remaining_cost],
        (false, true) => vec![products_cost],
        (false, false) => vec![products_cost, remaining_cost],
    };
    let total = outcome.absorb(sum_costs(&costs));

    Ok(RegimenCostResponse {
        products_cost,
        remaining_cost,
        total,
        remaining,
        issues: outcome.issues,
        as_of: now(),
    })
}

/// Regimen cost if `product_id` were added at one serving a day
pub fn projected_regimen_cost(db: &Database, product_id: &str) -> Result<ProjectedCostResponse, String> {
    let snapshot = Snapshot::load(db)?;

    let candidate = snapshot
        .products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| format!("Product not found: {}", product_id))?;

    let outcome = snapshot.project(candidate)?;

    Ok(ProjectedCostResponse {
        product_id: product_id.to_string(),
        projection: outcome.value,
        issues: outcome.issues,
        as_of: now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::{
        Frequency, IngredientRangeSet, IngredientType, IngredientUnits, ProductCreate,
        ProductIngredientCreate, ProductQuantity,
    };
    use crate::regimen::IssueKind;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            migrations::run_migrations(conn)?;
            IngredientType::upsert(conn, &IngredientType::new("Calcium", IngredientUnits::Mg))?;
            IngredientType::upsert(conn, &IngredientType::new("Zinc", IngredientUnits::Mg))?;
            IngredientPrice::set(
                conn,
                &IngredientPrice {
                    ingredient_name: "Calcium".to_string(),
                    price: 0.001,
                    units: IngredientUnits::Mg,
                },
            )?;
            for (name, minimum) in [("Calcium", 100.0), ("Zinc", 15.0)] {
                IngredientRange::set(
                    conn,
                    &IngredientRangeSet {
                        ingredient_name: name.to_string(),
                        minimum_amount: Some(minimum),
                        maximum_amount: None,
                        units: IngredientUnits::Mg,
                        frequency: Frequency::Daily,
                    },
                )?;
            }
            Ok(())
        })
        .unwrap();

        db.with_conn_mut(|conn| {
            for (id, calcium, price) in [("a", 50.0, 0.2), ("b", 30.0, 0.3)] {
                Product::create(
                    conn,
                    &ProductCreate {
                        id: id.to_string(),
                        name: id.to_string(),
                        brand: None,
                        unit_price: price,
                        ingredients: Some(vec![ProductIngredientCreate {
                            ingredient_name: "Calcium".to_string(),
                            amount: calcium,
                            units: IngredientUnits::Mg,
                        }]),
                    },
                )?;
            }
            Ok(())
        })
        .unwrap();

        db.with_conn(|conn| {
            RegimenProduct::upsert(conn, &RegimenProduct::new("a", ProductQuantity::default()))?;
            RegimenProduct::upsert(conn, &RegimenProduct::new("b", ProductQuantity::default()))?;
            Ok(())
        })
        .unwrap();
        db
    }

    #[test]
    fn test_end_to_end_calcium_gap() {
        let db = setup();

        let ingredients = regimen_ingredients(&db).unwrap();
        assert_eq!(ingredients.ingredients.len(), 1);
        assert_eq!(ingredients.ingredients[0].quantity.amount, 80.0);

        let gaps = ingredient_gaps_report(&db).unwrap();
        let calcium = gaps.gaps.iter().find(|g| g.name() == "Calcium").unwrap();
        assert_eq!(calcium.quantity.amount, 20.0);
        assert_eq!(calcium.frequency, Frequency::Daily);
        let zinc = gaps.gaps.iter().find(|g| g.name() == "Zinc").unwrap();
        assert_eq!(zinc.quantity.amount, 15.0);
    }

    #[test]
    fn test_regimen_cost_excludes_unpriced_zinc() {
        let db = setup();
        let report = regimen_cost(&db).unwrap();

        assert!((report.products_cost.money - 0.5).abs() < 1e-9);
        assert!((report.remaining_cost.money - 0.02).abs() < 1e-9);
        assert!((report.total.money - 0.52).abs() < 1e-9);
        assert!(report
            .issues
            .iter()
            .any(|i| i.kind == IssueKind::MissingPrice && i.ingredient.as_deref() == Some("Zinc")));
    }

    #[test]
    fn test_projected_cost_for_unknown_product() {
        let db = setup();
        assert!(projected_regimen_cost(&db, "ghost").is_err());

        let projected = projected_regimen_cost(&db, "a").unwrap();
        // Another serving of "a" covers the remaining 20mg of calcium
        assert_eq!(projected.projection.remaining_ingredients, 1);
        assert_eq!(projected.projection.remaining[0].name(), "Zinc");
    }
}

//! Regimen and goal tools
//!
//! Selecting products and the quantities taken, and setting ingredient goals.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Cost, IngredientRange, IngredientRangeSet, IngredientType, Product, ProductQuantity, RegimenProduct,
};
use crate::regimen::product_cost;

/// A regimen entry with catalog details
#[derive(Debug, Serialize)]
pub struct RegimenEntry {
    pub product_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub quantity: ProductQuantity,
    pub cost: Cost,
}

#[derive(Debug, Serialize)]
pub struct ListRegimenResponse {
    pub products: Vec<RegimenEntry>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub success: bool,
    pub removed: String,
}

#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<IngredientRange>,
    pub count: usize,
}

fn validate_quantity(quantity: &ProductQuantity) -> Result<(), String> {
    if !quantity.amount.is_finite() || quantity.amount < 0.0 {
        return Err("amount must be a non-negative number".to_string());
    }
    Ok(())
}

fn entry(product: &Product, regimen_product: RegimenProduct) -> RegimenEntry {
    RegimenEntry {
        cost: product_cost(product, &regimen_product.quantity),
        product_id: regimen_product.product_id,
        name: product.name.clone(),
        brand: product.brand.clone(),
        quantity: regimen_product.quantity,
    }
}

// ============================================================================
// Regimen Products
// ============================================================================

/// Add a product to the regimen (one serving a day unless given)
pub fn add_to_regimen(
    db: &Database,
    product_id: &str,
    quantity: Option<ProductQuantity>,
) -> Result<RegimenEntry, String> {
    let quantity = quantity.unwrap_or_default();
    validate_quantity(&quantity)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let product = Product::get_by_id(&conn, product_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Product not found: {}", product_id))?;

    let saved = RegimenProduct::upsert(&conn, &RegimenProduct::new(product_id, quantity))
        .map_err(|e| format!("Failed to add product to regimen: {}", e))?;
    tracing::info!(product_id = %product_id, amount = quantity.amount, "Product added to regimen");

    Ok(entry(&product, saved))
}

/// Change the quantity of a product already in the regimen
pub fn set_product_quantity(
    db: &Database,
    product_id: &str,
    quantity: ProductQuantity,
) -> Result<RegimenEntry, String> {
    validate_quantity(&quantity)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if RegimenProduct::get(&conn, product_id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Product is not in the regimen: {}", product_id));
    }

    let product = Product::get_by_id(&conn, product_id)
        .map_err(|e| format!("Database error: {}", e))?
        .ok_or_else(|| format!("Product not found: {}", product_id))?;

    let saved = RegimenProduct::upsert(&conn, &RegimenProduct::new(product_id, quantity))
        .map_err(|e| format!("Failed to update quantity: {}", e))?;

    Ok(entry(&product, saved))
}

pub fn remove_from_regimen(db: &Database, product_id: &str) -> Result<RemoveResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = RegimenProduct::remove(&conn, product_id)
        .map_err(|e| format!("Failed to remove product: {}", e))?;
    if !removed {
        return Err(format!("Product is not in the regimen: {}", product_id));
    }

    Ok(RemoveResponse {
        success: true,
        removed: product_id.to_string(),
    })
}

pub fn list_regimen(db: &Database) -> Result<ListRegimenResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let regimen = RegimenProduct::list(&conn).map_err(|e| format!("Failed to load regimen: {}", e))?;

    let mut products = Vec::with_capacity(regimen.len());
    for regimen_product in regimen {
        let product = Product::get_by_id(&conn, &regimen_product.product_id)
            .map_err(|e| format!("Database error: {}", e))?
            .ok_or_else(|| format!("Product not found: {}", regimen_product.product_id))?;
        products.push(entry(&product, regimen_product));
    }

    Ok(ListRegimenResponse {
        count: products.len(),
        products,
    })
}

// ============================================================================
// Goals
// ============================================================================

pub fn set_goal(db: &Database, data: IngredientRangeSet) -> Result<IngredientRange, String> {
    for (label, bound) in [("minimum", data.minimum_amount), ("maximum", data.maximum_amount)] {
        if let Some(v) = bound {
            if !v.is_finite() || v < 0.0 {
                return Err(format!("{} must be a non-negative number", label));
            }
        }
    }
    if let (Some(min), Some(max)) = (data.minimum_amount, data.maximum_amount) {
        if min > max {
            return Err("minimum cannot exceed maximum".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if IngredientType::get_by_name(&conn, &data.ingredient_name)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Ingredient type not found: {}", data.ingredient_name));
    }

    IngredientRange::set(&conn, &data).map_err(|e| format!("Failed to save goal: {}", e))
}

/// Add an unbounded daily goal for the first ingredient type without one
pub fn add_next_goal(db: &Database) -> Result<IngredientRange, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let existing = IngredientRange::list(&conn).map_err(|e| format!("Failed to load goals: {}", e))?;
    let types = IngredientType::list(&conn).map_err(|e| format!("Failed to load ingredient types: {}", e))?;

    let next = types
        .into_iter()
        .find(|t| existing.iter().all(|r| r.name() != t.name))
        .ok_or_else(|| "Every ingredient type already has a goal".to_string())?;

    let range = IngredientRange::unbounded(next);
    IngredientRange::set(
        &conn,
        &IngredientRangeSet {
            ingredient_name: range.ingredient_type.name.clone(),
            minimum_amount: None,
            maximum_amount: None,
            units: range.units,
            frequency: range.frequency,
        },
    )
    .map_err(|e| format!("Failed to save goal: {}", e))
}

pub fn remove_goal(db: &Database, ingredient_name: &str) -> Result<RemoveResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let removed = IngredientRange::remove(&conn, ingredient_name)
        .map_err(|e| format!("Failed to remove goal: {}", e))?;
    if !removed {
        return Err(format!("No goal set for: {}", ingredient_name));
    }

    Ok(RemoveResponse {
        success: true,
        removed: ingredient_name.to_string(),
    })
}

pub fn list_goals(db: &Database) -> Result<ListGoalsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let goals = IngredientRange::list(&conn).map_err(|e| format!("Failed to load goals: {}", e))?;

    Ok(ListGoalsResponse {
        count: goals.len(),
        goals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations;
    use crate::models::{Frequency, IngredientUnits, ProductCreate, ProductUnits};

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            migrations::run_migrations(conn)?;
            IngredientType::upsert(conn, &IngredientType::new("Calcium", IngredientUnits::Mg))?;
            IngredientType::upsert(conn, &IngredientType::new("B12", IngredientUnits::Mcg))?;
            Ok(())
        })
        .unwrap();
        db.with_conn_mut(|conn| {
            Product::create(
                conn,
                &ProductCreate {
                    id: "multi".to_string(),
                    name: "Multivitamin".to_string(),
                    brand: None,
                    unit_price: 0.5,
                    ingredients: None,
                },
            )
        })
        .unwrap();
        db
    }

    #[test]
    fn test_add_uses_default_quantity() {
        let db = setup();
        let added = add_to_regimen(&db, "multi", None).unwrap();
        assert_eq!(added.quantity, ProductQuantity::default());
        assert_eq!(added.cost, Cost::new(0.5, Frequency::Daily));
        assert!(add_to_regimen(&db, "ghost", None).is_err());
    }

    #[test]
    fn test_set_quantity_requires_membership() {
        let db = setup();
        let quantity = ProductQuantity {
            amount: 2.0,
            units: ProductUnits::Tablets,
            frequency: Frequency::Daily,
        };
        assert!(set_product_quantity(&db, "multi", quantity).is_err());

        add_to_regimen(&db, "multi", None).unwrap();
        let updated = set_product_quantity(&db, "multi", quantity).unwrap();
        assert_eq!(updated.cost.money, 1.0);

        let listed = list_regimen(&db).unwrap();
        assert_eq!(listed.count, 1);
        assert_eq!(listed.products[0].quantity.units, ProductUnits::Tablets);

        remove_from_regimen(&db, "multi").unwrap();
        assert!(remove_from_regimen(&db, "multi").is_err());
    }

    #[test]
    fn test_add_next_goal_walks_ingredient_types() {
        let db = setup();
        let first = add_next_goal(&db).unwrap();
        assert_eq!(first.name(), "Calcium");
        assert_eq!(first.units, IngredientUnits::Mg);
        assert!(first.minimum.is_none());

        let second = add_next_goal(&db).unwrap();
        assert_eq!(second.name(), "B12");
        assert_eq!(second.units, IngredientUnits::Mcg);
        assert_eq!(second.frequency, Frequency::Daily);

        assert!(add_next_goal(&db).is_err());

        remove_goal(&db, "Calcium").unwrap();
        assert_eq!(list_goals(&db).unwrap().count, 1);
    }

    #[test]
    fn test_set_goal_validates_bounds() {
        let db = setup();
        let mut data = IngredientRangeSet {
            ingredient_name: "Calcium".to_string(),
            minimum_amount: Some(1500.0),
            maximum_amount: Some(1200.0),
            units: IngredientUnits::Mg,
            frequency: Frequency::Daily,
        };
        assert!(set_goal(&db, data.clone()).is_err());

        data.maximum_amount = Some(2500.0);
        let goal = set_goal(&db, data).unwrap();
        assert_eq!(goal.minimum.map(|m| m.amount), Some(1500.0));
    }
}

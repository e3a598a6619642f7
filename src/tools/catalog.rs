//! Catalog tools
//!
//! Ingredient types, ingredient prices, and products.

use std::collections::HashMap;

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Cost, IngredientPrice, IngredientType, IngredientUnits, Product, ProductCreate, ProductQuantity,
    RegimenProduct,
};
use crate::regimen::{product_cost, sort_by_cost};
use super::analysis::Snapshot;

/// Product listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Name,
    /// Cheapest first at one serving a day
    CostAsc,
    /// Lowest projected regimen cost first, were the product added
    CostEffectiveness,
}

impl ProductSort {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(ProductSort::Name),
            "cost" | "cost_asc" | "price" => Some(ProductSort::CostAsc),
            "cost_effectiveness" | "value" => Some(ProductSort::CostEffectiveness),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListIngredientTypesResponse {
    pub ingredient_types: Vec<IngredientType>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ListIngredientPricesResponse {
    pub prices: Vec<IngredientPrice>,
    pub count: usize,
}

/// Product with its cost at the default quantity
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub default_cost: Cost,
    pub in_regimen: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub unit_price: f64,
    pub default_cost: Cost,
    /// Regimen cost with this product added; only for the cost-effectiveness sort
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projected_cost: Option<Cost>,
    /// `None` when the product has no nutrition facts
    pub ingredient_count: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<ProductSummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ProductDeleteBlockedResponse {
    pub error: String,
    pub regimen_usage_count: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductDeleteSuccessResponse {
    pub success: bool,
    pub deleted_id: String,
}

// ============================================================================
// Ingredient Types & Prices
// ============================================================================

pub fn add_ingredient_type(
    db: &Database,
    name: &str,
    default_units: IngredientUnits,
) -> Result<IngredientType, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    IngredientType::upsert(&conn, &IngredientType::new(name, default_units))
        .map_err(|e| format!("Failed to save ingredient type: {}", e))
}

pub fn list_ingredient_types(db: &Database) -> Result<ListIngredientTypesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let ingredient_types = IngredientType::list(&conn)
        .map_err(|e| format!("Failed to list ingredient types: {}", e))?;

    Ok(ListIngredientTypesResponse {
        count: ingredient_types.len(),
        ingredient_types,
    })
}

pub fn set_ingredient_price(db: &Database, data: IngredientPrice) -> Result<IngredientPrice, String> {
    if !data.price.is_finite() || data.price < 0.0 {
        return Err("price must be a non-negative number".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if IngredientType::get_by_name(&conn, &data.ingredient_name)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Ingredient type not found: {}", data.ingredient_name));
    }

    IngredientPrice::set(&conn, &data).map_err(|e| format!("Failed to save price: {}", e))
}

pub fn list_ingredient_prices(db: &Database) -> Result<ListIngredientPricesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let prices = IngredientPrice::list(&conn).map_err(|e| format!("Failed to list prices: {}", e))?;

    Ok(ListIngredientPricesResponse {
        count: prices.len(),
        prices,
    })
}

// ============================================================================
// Products
// ============================================================================

pub fn add_product(db: &Database, data: ProductCreate) -> Result<ProductDetail, String> {
    if data.id.trim().is_empty() {
        return Err("Product id cannot be empty".to_string());
    }
    if data.name.trim().is_empty() {
        return Err("Product name cannot be empty".to_string());
    }
    if !data.unit_price.is_finite() || data.unit_price < 0.0 {
        return Err("unit_price must be a non-negative number".to_string());
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Product::get_by_id(&conn, &data.id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some()
    {
        return Err(format!("Product already exists: {}", data.id));
    }

    if let Some(ref lines) = data.ingredients {
        for line in lines {
            if IngredientType::get_by_name(&conn, &line.ingredient_name)
                .map_err(|e| format!("Database error: {}", e))?
                .is_none()
            {
                return Err(format!("Ingredient type not found: {}", line.ingredient_name));
            }
        }
    }

    let product = Product::create(&mut conn, &data).map_err(|e| format!("Failed to create product: {}", e))?;
    tracing::info!(product_id = %product.id, "Added product to catalog");

    Ok(ProductDetail {
        default_cost: product_cost(&product, &ProductQuantity::default()),
        product,
        in_regimen: false,
    })
}

pub fn get_product(db: &Database, id: &str) -> Result<Option<ProductDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let Some(product) = Product::get_by_id(&conn, id).map_err(|e| format!("Database error: {}", e))? else {
        return Ok(None);
    };

    let in_regimen = RegimenProduct::get(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_some();

    Ok(Some(ProductDetail {
        default_cost: product_cost(&product, &ProductQuantity::default()),
        product,
        in_regimen,
    }))
}

pub fn list_products(
    db: &Database,
    query: Option<&str>,
    sort: ProductSort,
    limit: i64,
) -> Result<ListProductsResponse, String> {
    // Cost orderings must see every match before the limit applies
    let sql_limit = if sort == ProductSort::Name { limit } else { -1 };

    let products = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        match query {
            Some(q) if !q.trim().is_empty() => Product::search(&conn, q.trim(), sql_limit),
            _ => Product::list(&conn),
        }
        .map_err(|e| format!("Failed to list products: {}", e))?
    };

    let projected = match sort {
        ProductSort::CostEffectiveness => projected_costs(db, &products)?,
        _ => HashMap::new(),
    };

    let default_quantity = ProductQuantity::default();
    let mut ranked: Vec<(Product, Cost)> = products
        .into_iter()
        .map(|p| {
            let key = match projected.get(&p.id) {
                Some(cost) => *cost,
                None => product_cost(&p, &default_quantity),
            };
            (p, key)
        })
        .collect();

    if sort != ProductSort::Name {
        sort_by_cost(&mut ranked);
    }

    let products: Vec<ProductSummary> = ranked
        .into_iter()
        .take(limit.max(0) as usize)
        .map(|(p, _)| ProductSummary {
            default_cost: product_cost(&p, &default_quantity),
            projected_cost: projected.get(&p.id).copied(),
            ingredient_count: p.ingredients.as_ref().map(|i| i.len()),
            id: p.id,
            name: p.name,
            brand: p.brand,
            unit_price: p.unit_price,
        })
        .collect();

    Ok(ListProductsResponse {
        count: products.len(),
        products,
    })
}

/// Projected regimen cost per candidate product
fn projected_costs(db: &Database, candidates: &[Product]) -> Result<HashMap<String, Cost>, String> {
    let snapshot = Snapshot::load(db)?;
    candidates
        .iter()
        .map(|candidate| {
            let outcome = snapshot.project(candidate)?;
            Ok((candidate.id.clone(), outcome.value.cost))
        })
        .collect()
}

/// Delete a product (only allowed while it is not in the regimen)
pub fn delete_product(
    db: &Database,
    id: &str,
) -> Result<Result<ProductDeleteSuccessResponse, ProductDeleteBlockedResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    if Product::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?
        .is_none()
    {
        return Err(format!("Product not found: {}", id));
    }

    let regimen_usage_count = Product::get_regimen_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check regimen usage: {}", e))?;
    if regimen_usage_count > 0 {
        return Ok(Err(ProductDeleteBlockedResponse {
            error: "Cannot delete product: it is part of the current regimen".to_string(),
            regimen_usage_count,
        }));
    }

    Product::delete(&conn, id).map_err(|e| format!("Failed to delete product: {}", e))?;

    Ok(Ok(ProductDeleteSuccessResponse {
        success: true,
        deleted_id: id.to_string(),
    }))
}

//! Catalog product model
//!
//! A product carries per-serving nutrition facts and a per-serving price.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{invalid_column, IngredientQuantity, IngredientType, IngredientUnits};

/// One nutrition-fact line of a product, per serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIngredient {
    pub ingredient_type: IngredientType,
    pub quantity: IngredientQuantity,
}

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Money per serving
    pub unit_price: f64,
    /// `None` when the catalog has no nutrition facts for this product
    pub ingredients: Option<Vec<ProductIngredient>>,
}

/// Data for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub unit_price: f64,
    pub ingredients: Option<Vec<ProductIngredientCreate>>,
}

/// A nutrition-fact line referencing an existing ingredient type by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductIngredientCreate {
    pub ingredient_name: String,
    pub amount: f64,
    pub units: IngredientUnits,
}

impl Product {
    fn from_row(row: &Row) -> rusqlite::Result<(Self, bool)> {
        let has_facts: bool = row.get("has_nutrition_facts")?;
        Ok((
            Self {
                id: row.get("id")?,
                name: row.get("name")?,
                brand: row.get("brand")?,
                unit_price: row.get("unit_price")?,
                ingredients: None,
            },
            has_facts,
        ))
    }

    fn load_ingredients(conn: &Connection, product_id: &str) -> DbResult<Vec<ProductIngredient>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT pi.amount, pi.units, it.name, it.default_units
            FROM product_ingredients pi
            INNER JOIN ingredient_types it ON it.name = pi.ingredient_name
            WHERE pi.product_id = ?1
            ORDER BY pi.rowid ASC
            "#,
        )?;

        let rows = stmt
            .query_map([product_id], |row| {
                let units: String = row.get("units")?;
                let default_units: String = row.get("default_units")?;
                Ok(ProductIngredient {
                    ingredient_type: IngredientType {
                        name: row.get("name")?,
                        default_units: IngredientUnits::from_str(&default_units)
                            .ok_or_else(|| invalid_column("default_units", &default_units))?,
                    },
                    quantity: IngredientQuantity {
                        amount: row.get("amount")?,
                        units: IngredientUnits::from_str(&units)
                            .ok_or_else(|| invalid_column("units", &units))?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn hydrate(conn: &Connection, (mut product, has_facts): (Self, bool)) -> DbResult<Self> {
        if has_facts {
            product.ingredients = Some(Self::load_ingredients(conn, &product.id)?);
        }
        Ok(product)
    }

    /// Insert a product and its nutrition facts in one transaction
    pub fn create(conn: &mut Connection, data: &ProductCreate) -> DbResult<Self> {
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO products (id, name, brand, unit_price, has_nutrition_facts)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.id,
                data.name,
                data.brand,
                data.unit_price,
                data.ingredients.is_some(),
            ],
        )?;

        if let Some(ref lines) = data.ingredients {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO product_ingredients (product_id, ingredient_name, amount, units)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for line in lines {
                stmt.execute(params![data.id, line.ingredient_name, line.amount, line.units.as_str()])?;
            }
        }

        tx.commit()?;

        Self::get_by_id(conn, &data.id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products WHERE id = ?1")?;

        let row = match stmt.query_row([id], Self::from_row) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(Self::hydrate(conn, row)?))
    }

    /// Search products by name or brand
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let pattern = format!("%{}%", query);
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM products
            WHERE name LIKE ?1 OR brand LIKE ?1
            ORDER BY name ASC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| Self::hydrate(conn, row)).collect()
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products ORDER BY name ASC")?;
        let rows = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| Self::hydrate(conn, row)).collect()
    }

    /// Number of regimen entries referencing this product
    pub fn get_regimen_usage_count(conn: &Connection, id: &str) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM regimen_products WHERE product_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a product. Nutrition facts go with it (cascade).
    pub fn delete(conn: &Connection, id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM products WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

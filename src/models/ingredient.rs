//! Ingredient types, prices, and realized regimen ingredients

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{invalid_column, Frequency, IngredientQuantity, IngredientUnits};

/// Identity of a nutritional ingredient, keyed by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientType {
    pub name: String,
    pub default_units: IngredientUnits,
}

impl IngredientType {
    pub fn new(name: impl Into<String>, default_units: IngredientUnits) -> Self {
        Self {
            name: name.into(),
            default_units,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let units: String = row.get("default_units")?;
        Ok(Self {
            name: row.get("name")?,
            default_units: IngredientUnits::from_str(&units)
                .ok_or_else(|| invalid_column("default_units", &units))?,
        })
    }

    /// Insert or replace an ingredient type
    pub fn upsert(conn: &Connection, data: &IngredientType) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO ingredient_types (name, default_units) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET default_units = excluded.default_units
            "#,
            params![data.name, data.default_units.as_str()],
        )?;

        Self::get_by_name(conn, &data.name)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_types WHERE name = ?1")?;

        match stmt.query_row([name], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All ingredient types in insertion order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_types ORDER BY rowid ASC")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// Money per one unit of an ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientPrice {
    pub ingredient_name: String,
    pub price: f64,
    pub units: IngredientUnits,
}

impl IngredientPrice {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let units: String = row.get("units")?;
        Ok(Self {
            ingredient_name: row.get("ingredient_name")?,
            price: row.get("price")?,
            units: IngredientUnits::from_str(&units).ok_or_else(|| invalid_column("units", &units))?,
        })
    }

    /// Set (insert or replace) the price of an ingredient
    pub fn set(conn: &Connection, data: &IngredientPrice) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO ingredient_prices (ingredient_name, price, units) VALUES (?1, ?2, ?3)
            ON CONFLICT(ingredient_name) DO UPDATE SET
                price = excluded.price,
                units = excluded.units,
                updated_at = datetime('now')
            "#,
            params![data.ingredient_name, data.price, data.units.as_str()],
        )?;

        Self::get(conn, &data.ingredient_name)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get(conn: &Connection, ingredient_name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_prices WHERE ingredient_name = ?1")?;

        match stmt.query_row([ingredient_name], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_prices ORDER BY ingredient_name ASC")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }
}

/// The amount of one ingredient realized by (or still missing from) a regimen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimenIngredient {
    pub ingredient_type: IngredientType,
    pub quantity: IngredientQuantity,
    pub frequency: Frequency,
}

impl RegimenIngredient {
    pub fn name(&self) -> &str {
        &self.ingredient_type.name
    }

    /// Same ingredient and frequency, different amount
    pub fn with_amount(&self, amount: f64) -> Self {
        Self {
            ingredient_type: self.ingredient_type.clone(),
            quantity: IngredientQuantity::new(amount, self.quantity.units),
            frequency: self.frequency,
        }
    }
}

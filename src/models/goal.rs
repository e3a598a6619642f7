//! Goal range model
//!
//! A user-specified minimum/maximum target for one ingredient.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{invalid_column, Frequency, IngredientQuantity, IngredientType, IngredientUnits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRange {
    pub ingredient_type: IngredientType,
    /// Treated as zero when unset
    pub minimum: Option<IngredientQuantity>,
    pub maximum: Option<IngredientQuantity>,
    pub units: IngredientUnits,
    pub frequency: Frequency,
}

/// Data for setting a goal range. Bounds share the range units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientRangeSet {
    pub ingredient_name: String,
    pub minimum_amount: Option<f64>,
    pub maximum_amount: Option<f64>,
    pub units: IngredientUnits,
    pub frequency: Frequency,
}

impl IngredientRange {
    /// An unbounded daily goal in the ingredient's default units
    pub fn unbounded(ingredient_type: IngredientType) -> Self {
        let units = ingredient_type.default_units;
        Self {
            ingredient_type,
            minimum: None,
            maximum: None,
            units,
            frequency: Frequency::Daily,
        }
    }

    pub fn name(&self) -> &str {
        &self.ingredient_type.name
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let units_str: String = row.get("units")?;
        let default_units: String = row.get("default_units")?;
        let frequency: String = row.get("frequency")?;

        let units = IngredientUnits::from_str(&units_str)
            .ok_or_else(|| invalid_column("units", &units_str))?;
        let minimum: Option<f64> = row.get("minimum_amount")?;
        let maximum: Option<f64> = row.get("maximum_amount")?;

        Ok(Self {
            ingredient_type: IngredientType {
                name: row.get("ingredient_name")?,
                default_units: IngredientUnits::from_str(&default_units)
                    .ok_or_else(|| invalid_column("default_units", &default_units))?,
            },
            minimum: minimum.map(|amount| IngredientQuantity::new(amount, units)),
            maximum: maximum.map(|amount| IngredientQuantity::new(amount, units)),
            units,
            frequency: Frequency::from_str(&frequency)
                .ok_or_else(|| invalid_column("frequency", &frequency))?,
        })
    }

    /// Set (insert or replace) the goal for one ingredient
    pub fn set(conn: &Connection, data: &IngredientRangeSet) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO ingredient_ranges (ingredient_name, minimum_amount, maximum_amount, units, frequency)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(ingredient_name) DO UPDATE SET
                minimum_amount = excluded.minimum_amount,
                maximum_amount = excluded.maximum_amount,
                units = excluded.units,
                frequency = excluded.frequency,
                updated_at = datetime('now')
            "#,
            params![
                data.ingredient_name,
                data.minimum_amount,
                data.maximum_amount,
                data.units.as_str(),
                data.frequency.as_str(),
            ],
        )?;

        Self::get(conn, &data.ingredient_name)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get(conn: &Connection, ingredient_name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.*, it.default_units FROM ingredient_ranges r
            INNER JOIN ingredient_types it ON it.name = r.ingredient_name
            WHERE r.ingredient_name = ?1
            "#,
        )?;

        match stmt.query_row([ingredient_name], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All goals in the order they were added
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.*, it.default_units FROM ingredient_ranges r
            INNER JOIN ingredient_types it ON it.name = r.ingredient_name
            ORDER BY r.rowid ASC
            "#,
        )?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn remove(conn: &Connection, ingredient_name: &str) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM ingredient_ranges WHERE ingredient_name = ?1",
            [ingredient_name],
        )?;
        Ok(rows > 0)
    }
}

//! Regimen product model
//!
//! A product the user takes, with the chosen amount and frequency.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::{invalid_column, Frequency, ProductQuantity, ProductUnits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimenProduct {
    pub product_id: String,
    pub quantity: ProductQuantity,
}

impl RegimenProduct {
    pub fn new(product_id: impl Into<String>, quantity: ProductQuantity) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let units: String = row.get("units")?;
        let frequency: String = row.get("frequency")?;
        Ok(Self {
            product_id: row.get("product_id")?,
            quantity: ProductQuantity {
                amount: row.get("amount")?,
                units: ProductUnits::from_str(&units).ok_or_else(|| invalid_column("units", &units))?,
                frequency: Frequency::from_str(&frequency)
                    .ok_or_else(|| invalid_column("frequency", &frequency))?,
            },
        })
    }

    /// Add a product to the regimen, replacing its quantity if already present
    pub fn upsert(conn: &Connection, data: &RegimenProduct) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO regimen_products (product_id, amount, units, frequency)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(product_id) DO UPDATE SET
                amount = excluded.amount,
                units = excluded.units,
                frequency = excluded.frequency,
                updated_at = datetime('now')
            "#,
            params![
                data.product_id,
                data.quantity.amount,
                data.quantity.units.as_str(),
                data.quantity.frequency.as_str(),
            ],
        )?;

        Self::get(conn, &data.product_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get(conn: &Connection, product_id: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM regimen_products WHERE product_id = ?1")?;

        match stmt.query_row([product_id], Self::from_row) {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The current regimen, oldest addition first
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM regimen_products ORDER BY added_at ASC, rowid ASC")?;
        let items = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn remove(conn: &Connection, product_id: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM regimen_products WHERE product_id = ?1", [product_id])?;
        Ok(rows > 0)
    }
}

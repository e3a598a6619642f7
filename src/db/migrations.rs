//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENT TYPES
        -- Reference data, keyed by name
        -- ============================================
        CREATE TABLE ingredient_types (
            name TEXT PRIMARY KEY,
            default_units TEXT NOT NULL,         -- "mg", "mcg", "g", "iu", "ml"
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- INGREDIENT PRICES
        -- Money per one unit of the ingredient
        -- ============================================
        CREATE TABLE ingredient_prices (
            ingredient_name TEXT PRIMARY KEY REFERENCES ingredient_types(name) ON DELETE CASCADE,
            price REAL NOT NULL,
            units TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- PRODUCTS
        -- Catalog entries; nutrition facts are per serving
        -- ============================================
        CREATE TABLE products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT,
            unit_price REAL NOT NULL,            -- money per serving
            has_nutrition_facts INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_products_name ON products(name);
        CREATE INDEX idx_products_brand ON products(brand);

        CREATE TABLE product_ingredients (
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            ingredient_name TEXT NOT NULL REFERENCES ingredient_types(name),
            amount REAL NOT NULL,
            units TEXT NOT NULL,
            PRIMARY KEY (product_id, ingredient_name)
        );

        CREATE INDEX idx_product_ingredients_name ON product_ingredients(ingredient_name);

        -- ============================================
        -- REGIMEN
        -- The products the user currently takes
        -- ============================================
        CREATE TABLE regimen_products (
            product_id TEXT PRIMARY KEY REFERENCES products(id) ON DELETE CASCADE,
            amount REAL NOT NULL,
            units TEXT NOT NULL,                 -- "servings", "capsules", ...
            frequency TEXT NOT NULL,             -- "daily", "weekly", ...
            added_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- GOALS
        -- Desired ingredient ranges; bounds are in `units`
        -- ============================================
        CREATE TABLE ingredient_ranges (
            ingredient_name TEXT PRIMARY KEY REFERENCES ingredient_types(name) ON DELETE CASCADE,
            minimum_amount REAL,                 -- NULL = no minimum
            maximum_amount REAL,                 -- NULL = no maximum
            units TEXT NOT NULL,
            frequency TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    #[test]
    fn test_migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            run_migrations(conn)?;
            assert_eq!(get_schema_version(conn)?, SCHEMA_VERSION);
            assert!(!needs_migration(conn)?);
            Ok(())
        })
        .unwrap();
    }
}

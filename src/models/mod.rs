//! Data models
//!
//! Catalog, regimen and goal records, plus the quantity types they share.

mod goal;
mod ingredient;
mod product;
mod quantity;
mod regimen_product;

pub use goal::{IngredientRange, IngredientRangeSet};
pub use ingredient::{IngredientPrice, IngredientType, RegimenIngredient};
pub use product::{Product, ProductCreate, ProductIngredient, ProductIngredientCreate};
pub use quantity::{Cost, Frequency, IngredientQuantity, IngredientUnits, ProductQuantity, ProductUnits};
pub use regimen_product::RegimenProduct;

/// Error for a stored enum column holding an unrecognized value
pub(crate) fn invalid_column(column: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("invalid {} '{}'", column, value).into(),
    )
}

//! Quantities, units, frequencies and costs
//!
//! Plain value types shared by the catalog, the regimen and the calculators.

use serde::{Deserialize, Serialize};

/// Unit of measure for an ingredient amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientUnits {
    Mg,
    Mcg,
    G,
    Iu,
    Ml,
}

impl IngredientUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientUnits::Mg => "mg",
            IngredientUnits::Mcg => "mcg",
            IngredientUnits::G => "g",
            IngredientUnits::Iu => "iu",
            IngredientUnits::Ml => "ml",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mg" | "milligram" | "milligrams" => Some(IngredientUnits::Mg),
            "mcg" | "ug" | "microgram" | "micrograms" => Some(IngredientUnits::Mcg),
            "g" | "gram" | "grams" => Some(IngredientUnits::G),
            "iu" => Some(IngredientUnits::Iu),
            "ml" | "milliliter" | "milliliters" => Some(IngredientUnits::Ml),
            _ => None,
        }
    }
}

/// Time basis of a quantity or cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Some(Frequency::Daily),
            "weekly" | "week" => Some(Frequency::Weekly),
            "monthly" | "month" => Some(Frequency::Monthly),
            "yearly" | "year" | "annually" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// Unit a product is taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductUnits {
    #[default]
    Servings,
    Capsules,
    Tablets,
    Scoops,
}

impl ProductUnits {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductUnits::Servings => "servings",
            ProductUnits::Capsules => "capsules",
            ProductUnits::Tablets => "tablets",
            ProductUnits::Scoops => "scoops",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "serving" | "servings" => Some(ProductUnits::Servings),
            "capsule" | "capsules" | "cap" => Some(ProductUnits::Capsules),
            "tablet" | "tablets" | "tab" => Some(ProductUnits::Tablets),
            "scoop" | "scoops" => Some(ProductUnits::Scoops),
            _ => None,
        }
    }
}

/// An ingredient amount in a unit of measure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IngredientQuantity {
    /// May go negative after subtraction
    pub amount: f64,
    pub units: IngredientUnits,
}

impl IngredientQuantity {
    pub fn new(amount: f64, units: IngredientUnits) -> Self {
        Self { amount, units }
    }

    pub fn zero(units: IngredientUnits) -> Self {
        Self::new(0.0, units)
    }

    pub fn scale(&self, multiplier: f64) -> Self {
        Self::new(self.amount * multiplier, self.units)
    }
}

/// How much of a product is taken, and how often
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub amount: f64,
    pub units: ProductUnits,
    pub frequency: Frequency,
}

impl Default for ProductQuantity {
    /// One serving a day
    fn default() -> Self {
        Self {
            amount: 1.0,
            units: ProductUnits::Servings,
            frequency: Frequency::Daily,
        }
    }
}

/// A monetary amount on a time basis. No currency, no rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub money: f64,
    pub frequency: Frequency,
}

impl Cost {
    pub fn new(money: f64, frequency: Frequency) -> Self {
        Self { money, frequency }
    }

    pub fn zero(frequency: Frequency) -> Self {
        Self::new(0.0, frequency)
    }
}

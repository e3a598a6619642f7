//! Regimen Builder MCP Server Implementation
//!
//! Exposes the catalog, regimen, goal and analysis tools over MCP.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    Frequency, IngredientPrice, IngredientRangeSet, IngredientUnits, ProductCreate,
    ProductIngredientCreate, ProductQuantity, ProductUnits,
};
use crate::tools::analysis;
use crate::tools::catalog::{self, ProductSort};
use crate::tools::regimen;
use crate::tools::status::StatusTracker;

/// Regimen Builder MCP Service
#[derive(Clone)]
pub struct RegimenService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<RegimenService>,
}

impl RegimenService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_ingredient_units(s: &str) -> Result<IngredientUnits, McpError> {
    IngredientUnits::from_str(s).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown ingredient units '{}' (use mg, mcg, g, iu, ml)", s), None)
    })
}

fn parse_frequency(s: Option<&str>) -> Result<Frequency, McpError> {
    match s {
        None => Ok(Frequency::default()),
        Some(s) => Frequency::from_str(s).ok_or_else(|| {
            McpError::invalid_params(format!("Unknown frequency '{}' (use daily, weekly, monthly, yearly)", s), None)
        }),
    }
}

fn parse_product_units(s: Option<&str>) -> Result<ProductUnits, McpError> {
    match s {
        None => Ok(ProductUnits::default()),
        Some(s) => ProductUnits::from_str(s).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown product units '{}' (use servings, capsules, tablets, scoops)", s),
                None,
            )
        }),
    }
}

// ============================================================================
// Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientTypeParams {
    /// Ingredient name, e.g. "Calcium"
    pub name: String,
    /// Default units: mg, mcg, g, iu, ml
    pub default_units: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetIngredientPriceParams {
    pub ingredient_name: String,
    /// Money per one unit of the ingredient
    pub price: f64,
    /// Units the price is per: mg, mcg, g, iu, ml
    pub units: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductIngredientParams {
    pub ingredient_name: String,
    /// Amount per serving
    pub amount: f64,
    pub units: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddProductParams {
    /// Catalog identifier
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Money per serving
    pub unit_price: f64,
    /// Per-serving nutrition facts; omit when unknown
    pub ingredients: Option<Vec<ProductIngredientParams>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductIdParams {
    pub product_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListProductsParams {
    /// Search by name or brand (optional)
    pub query: Option<String>,
    /// "name" (default), "cost" (cheapest first), or "cost_effectiveness"
    /// (lowest projected regimen cost first)
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

fn default_sort_by() -> String { "name".to_string() }
fn default_list_limit() -> i64 { 50 }

// ============================================================================
// Regimen Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddToRegimenParams {
    pub product_id: String,
    /// Amount taken (default 1)
    pub amount: Option<f64>,
    /// servings (default), capsules, tablets, scoops
    pub units: Option<String>,
    /// daily (default), weekly, monthly, yearly
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetProductQuantityParams {
    pub product_id: String,
    pub amount: f64,
    pub units: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetGoalParams {
    pub ingredient_name: String,
    pub minimum_amount: Option<f64>,
    pub maximum_amount: Option<f64>,
    /// Units of both bounds: mg, mcg, g, iu, ml
    pub units: String,
    /// daily (default), weekly, monthly, yearly
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientNameParams {
    pub ingredient_name: String,
}

// ============================================================================
// Tools
// ============================================================================

#[tool_router]
impl RegimenService {
    // --- Status ---

    #[tool(description = "Get the current status of the regimen builder including build info, database status, and process information")]
    async fn regimen_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        to_json(&status)
    }

    #[tool(description = "Get instructions for building a regimen. Call this when starting a session or when unsure how to use the tools.")]
    fn regimen_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::REGIMEN_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(REGIMEN_INSTRUCTIONS)]))
    }

    // --- Catalog ---

    #[tool(description = "Add or update an ingredient type with its default units")]
    fn add_ingredient_type(&self, Parameters(p): Parameters<AddIngredientTypeParams>) -> Result<CallToolResult, McpError> {
        let units = parse_ingredient_units(&p.default_units)?;
        let result = catalog::add_ingredient_type(&self.database, &p.name, units).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List all ingredient types")]
    fn list_ingredient_types(&self) -> Result<CallToolResult, McpError> {
        let result = catalog::list_ingredient_types(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Set the price per unit of an ingredient, used to cost unmet goals")]
    fn set_ingredient_price(&self, Parameters(p): Parameters<SetIngredientPriceParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientPrice {
            ingredient_name: p.ingredient_name,
            price: p.price,
            units: parse_ingredient_units(&p.units)?,
        };
        let result = catalog::set_ingredient_price(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List all ingredient prices")]
    fn list_ingredient_prices(&self) -> Result<CallToolResult, McpError> {
        let result = catalog::list_ingredient_prices(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add a product to the catalog with per-serving nutrition facts and price")]
    fn add_product(&self, Parameters(p): Parameters<AddProductParams>) -> Result<CallToolResult, McpError> {
        let ingredients = match p.ingredients {
            Some(lines) => Some(
                lines
                    .into_iter()
                    .map(|l| {
                        Ok(ProductIngredientCreate {
                            units: parse_ingredient_units(&l.units)?,
                            ingredient_name: l.ingredient_name,
                            amount: l.amount,
                        })
                    })
                    .collect::<Result<Vec<_>, McpError>>()?,
            ),
            None => None,
        };
        let data = ProductCreate { id: p.id, name: p.name, brand: p.brand, unit_price: p.unit_price, ingredients };
        let result = catalog::add_product(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a product with its nutrition facts, default cost, and whether it is in the regimen")]
    fn get_product(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::get_product(&self.database, &p.product_id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(detail) => to_json(&detail),
            None => to_json(&serde_json::json!({"error": "Product not found", "id": p.product_id})),
        }
    }

    #[tool(description = "List or search catalog products, sorted by name, by cost (cheapest first), or by cost effectiveness (lowest projected regimen cost first)")]
    fn list_products(&self, Parameters(p): Parameters<ListProductsParams>) -> Result<CallToolResult, McpError> {
        let sort = ProductSort::from_str(&p.sort_by).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown sort_by '{}' (use name, cost, cost_effectiveness)", p.sort_by),
                None,
            )
        })?;
        let result = catalog::list_products(&self.database, p.query.as_deref(), sort, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a product from the catalog (only allowed if it is not in the regimen)")]
    fn delete_product(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::delete_product(&self.database, &p.product_id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => to_json(&success),
            Err(blocked) => to_json(&blocked),
        }
    }

    // --- Regimen ---

    #[tool(description = "Add a product to the regimen. Defaults to 1 serving daily.")]
    fn add_to_regimen(&self, Parameters(p): Parameters<AddToRegimenParams>) -> Result<CallToolResult, McpError> {
        let quantity = ProductQuantity {
            amount: p.amount.unwrap_or(1.0),
            units: parse_product_units(p.units.as_deref())?,
            frequency: parse_frequency(p.frequency.as_deref())?,
        };
        let result = regimen::add_to_regimen(&self.database, &p.product_id, Some(quantity))
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Change how much of a regimen product is taken, and how often")]
    fn set_product_quantity(&self, Parameters(p): Parameters<SetProductQuantityParams>) -> Result<CallToolResult, McpError> {
        let quantity = ProductQuantity {
            amount: p.amount,
            units: parse_product_units(p.units.as_deref())?,
            frequency: parse_frequency(p.frequency.as_deref())?,
        };
        let result = regimen::set_product_quantity(&self.database, &p.product_id, quantity)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove a product from the regimen")]
    fn remove_from_regimen(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = regimen::remove_from_regimen(&self.database, &p.product_id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List the products in the regimen with quantities and costs")]
    fn list_regimen(&self) -> Result<CallToolResult, McpError> {
        let result = regimen::list_regimen(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Goals ---

    #[tool(description = "Set the minimum and/or maximum goal for an ingredient")]
    fn set_goal(&self, Parameters(p): Parameters<SetGoalParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientRangeSet {
            ingredient_name: p.ingredient_name,
            minimum_amount: p.minimum_amount,
            maximum_amount: p.maximum_amount,
            units: parse_ingredient_units(&p.units)?,
            frequency: parse_frequency(p.frequency.as_deref())?,
        };
        let result = regimen::set_goal(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add an empty daily goal for the next ingredient type that has none")]
    fn add_next_goal(&self) -> Result<CallToolResult, McpError> {
        let result = regimen::add_next_goal(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Remove the goal for an ingredient")]
    fn remove_goal(&self, Parameters(p): Parameters<IngredientNameParams>) -> Result<CallToolResult, McpError> {
        let result = regimen::remove_goal(&self.database, &p.ingredient_name).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List all ingredient goals")]
    fn list_goals(&self) -> Result<CallToolResult, McpError> {
        let result = regimen::list_goals(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Analysis ---

    #[tool(description = "Total ingredient amounts provided by the current regimen")]
    fn regimen_ingredients(&self) -> Result<CallToolResult, McpError> {
        let result = analysis::regimen_ingredients(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Amount still needed for each goal the regimen does not meet")]
    fn ingredient_gaps(&self) -> Result<CallToolResult, McpError> {
        let result = analysis::ingredient_gaps_report(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Cost of the regimen's products plus the cost of buying unmet goals as raw ingredients")]
    fn regimen_cost(&self) -> Result<CallToolResult, McpError> {
        let result = analysis::regimen_cost(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Projected regimen cost if a product were added at 1 serving daily, with the ingredients still missing afterwards")]
    fn projected_regimen_cost(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        let result = analysis::projected_regimen_cost(&self.database, &p.product_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for RegimenService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "regimen_builder".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Regimen Builder".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Regimen Builder - supplement regimen planning against ingredient goals. \
                 IMPORTANT: Call regimen_instructions first. \
                 Catalog: add/list_ingredient_types, set/list_ingredient_prices, add/get/list/delete_product. \
                 Regimen: add_to_regimen, set_product_quantity, remove_from_regimen, list_regimen. \
                 Goals: set_goal, add_next_goal, remove_goal, list_goals. \
                 Analysis: regimen_ingredients, ingredient_gaps, regimen_cost, projected_regimen_cost. \
                 Analysis responses list any values left out in `issues`."
                    .into(),
            ),
        }
    }
}

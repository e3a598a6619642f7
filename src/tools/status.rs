//! Status tool
//!
//! Runtime status of the service, and usage instructions for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{migrations, Database};

/// Regimen planning instructions for AI assistants
pub const REGIMEN_INSTRUCTIONS: &str = r#"
# Regimen Builder Instructions

## Overview

1. **Ingredient types** - nutrients such as "Calcium", each with default units
2. **Products** - catalog supplements; nutrition facts and price are per serving
3. **Regimen** - the products the user takes, with amount and frequency
4. **Goals** - minimum/maximum targets per ingredient

## Typical Workflow

1. `list_ingredient_types` / `add_ingredient_type`
2. `add_product` with its per-serving nutrition facts and `unit_price`
3. `set_goal` (or `add_next_goal`) for each ingredient the user cares about
4. `add_to_regimen`, then `set_product_quantity` as the user adjusts
5. `ingredient_gaps` shows what is still missing
6. `projected_regimen_cost` compares candidate products; `list_products` with
   `sort_by: "cost_effectiveness"` ranks the whole catalog that way

## Units and Frequencies

- Ingredient units: mg, mcg, g, iu, ml
- Product units: servings, capsules, tablets, scoops
- Frequencies: daily, weekly, monthly, yearly

Nothing is converted. Amounts in different units, or on different
frequencies, are never added together. When that happens the tool leaves the
value out and reports it in `issues`. Set goals in the same units and
frequency the product labels use.

## Reading Results

- Every analysis response carries an `issues` list. An empty list means every
  value was counted.
- `missing_price` means an ingredient had no price; its cost is left out.
- `missing_nutrition_facts` means a product has no ingredient list and
  contributes nothing.
- Goals with no minimum are treated as minimum zero, so they never show a gap.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct RegimenStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub needs_migration: Option<bool>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Collects runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    pub fn get_status(&self, database: &Database) -> RegimenStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path).ok().map(|m| m.len());

        let schema = database.with_conn(|conn| {
            Ok((migrations::get_schema_version(conn)?, migrations::needs_migration(conn)?))
        });
        let (schema_version, needs_migration) = match schema {
            Ok((version, needs)) => (Some(version), Some(needs)),
            Err(e) => {
                tracing::warn!("Could not read schema version: {}", e);
                (None, None)
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));
        let memory_usage_bytes = sys.process(Pid::from_u32(pid)).map(|p| p.memory()).unwrap_or(0);

        RegimenStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            needs_migration,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

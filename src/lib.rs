//! Regimen Builder Library
//!
//! Supplement regimen planning: catalog, ingredient goals, gaps and cost projection.

pub mod build_info;
pub mod db;
pub mod mcp;
pub mod models;
pub mod regimen;
pub mod tools;

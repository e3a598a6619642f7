//! Tools module
//!
//! Tool implementations behind the MCP server.

pub mod analysis;
pub mod catalog;
pub mod regimen;
pub mod status;

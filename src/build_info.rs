//! Build information
//!
//! Version and build counter baked in by `build.rs`, reported by the status
//! tool and the startup banner.

use serde::Serialize;

use crate::db::migrations::SCHEMA_VERSION;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("REGIMEN_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("REGIMEN_BUILD_TIMESTAMP");

#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// 0 when built without `build.rs` output
    pub build_number: u64,
    pub build_timestamp: &'static str,
    /// Schema this binary migrates databases to
    pub schema_version: i32,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: RAW_BUILD_NUMBER
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            build_timestamp: RAW_BUILD_TIMESTAMP.unwrap_or("unknown"),
            schema_version: SCHEMA_VERSION,
        }
    }

    /// `regimen_builder 0.1.0+build.7`
    pub fn label(&self) -> String {
        format!("{} {}+build.{}", self.name, self.version, self.build_number)
    }

    pub fn banner(&self) -> String {
        let rule = "-".repeat(47);
        format!(
            "{rule}\n  Regimen Builder ({label})\n  Compiled {ts}, schema v{schema}\n{rule}",
            label = self.label(),
            ts = self.build_timestamp,
            schema = self.schema_version,
        )
    }
}

/// Stdout belongs to the MCP transport, so the banner goes to stderr
pub fn print_startup_banner() {
    eprintln!("{}", BuildInfo::current().banner());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_banner() {
        let info = BuildInfo {
            name: "regimen_builder",
            version: "1.2.3",
            build_number: 7,
            build_timestamp: "2024-01-01T00:00:00Z",
            schema_version: 1,
        };
        assert_eq!(info.label(), "regimen_builder 1.2.3+build.7");

        let banner = info.banner();
        assert!(banner.contains("regimen_builder 1.2.3+build.7"));
        assert!(banner.contains("Compiled 2024-01-01T00:00:00Z, schema v1"));
    }

    #[test]
    fn test_current_reports_schema() {
        let info = BuildInfo::current();
        assert_eq!(info.schema_version, SCHEMA_VERSION);
        assert_eq!(info.version, VERSION);
    }
}

//! Output of the offline subcommands (`check`, `routes`, `default-config`).
//!
//! Each function renders to a `String`; `main` only prints.

use std::path::Path;

use crate::config::SiteConfig;
use crate::routing::RouteTable;

/// How `routes` prints the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    Columns,
    Json,
}

/// One-line summary for a config that loaded and validated.
pub fn check_report(path: &Path, config: &SiteConfig) -> String {
    let table = RouteTable::from_config(config);
    format!(
        "{}: ok ({} pages, {} routes)",
        path.display(),
        config.pages.len(),
        table.len()
    )
}

/// The route table in declaration order.
pub fn route_listing(table: &RouteTable, format: ListingFormat) -> Result<String, serde_json::Error> {
    match format {
        ListingFormat::Json => serde_json::to_string_pretty(table.routes()),
        ListingFormat::Columns => Ok(table
            .routes()
            .iter()
            .map(|route| {
                let line = format!(
                    "{:<20} {:<40} {}",
                    route.pattern,
                    route.target.to_string(),
                    route.name.as_deref().unwrap_or("")
                );
                line.trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// The built-in site as a config file.
pub fn default_config_toml() -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(&SiteConfig::default())
}

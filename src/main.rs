//! Marketing site server (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ limits ─▶ ┬─ static prefix ─▶ ServeDir
//!                                                      │
//!                                                      └─ dispatch ─▶ RouteTable
//!                                                                       │
//!                                       ┌───────────────┬───────────────┤
//!                                       ▼               ▼               ▼
//!                                  PageSource      301/302 +        404 Not Found
//!                                  200 text/html   Location
//!
//!     config.toml ─▶ loader ─▶ validation ─▶ SiteSnapshot (ArcSwap, swapped on reload)
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use marketing_site::cli::{self, ListingFormat};
use marketing_site::lifecycle::startup::{self, load_site_config, StartupOptions};
use marketing_site::observability::logging;
use marketing_site::routing::RouteTable;

#[derive(Parser)]
#[command(name = "marketing-site", version)]
#[command(about = "Route table server for the marketing site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server (default)
    Serve {
        /// Config file; the built-in site is used when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Reload when the config file changes
        #[arg(long, requires = "config")]
        watch: bool,
    },
    /// Validate a config file
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the route table in declaration order
    Routes {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of columns
        #[arg(long)]
        json: bool,
    },
    /// Print the default configuration as TOML
    DefaultConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        config: None,
        watch: false,
    }) {
        Commands::Serve { config, watch } => {
            let site = load_site_config(config.as_deref())?;
            logging::init_logging(&site.observability)?;
            tracing::info!("marketing-site v{} starting", env!("CARGO_PKG_VERSION"));

            let options = StartupOptions {
                config_path: config,
                watch,
            };
            startup::run(site, options).await?;
        }
        Commands::Check { config } => {
            let site = load_site_config(Some(config.as_path()))?;
            println!("{}", cli::check_report(&config, &site));
        }
        Commands::Routes { config, json } => {
            let site = load_site_config(config.as_deref())?;
            let table = RouteTable::from_config(&site);
            let format = if json {
                ListingFormat::Json
            } else {
                ListingFormat::Columns
            };
            println!("{}", cli::route_listing(&table, format)?);
        }
        Commands::DefaultConfig => {
            print!("{}", cli::default_config_toml()?);
        }
    }

    Ok(())
}

//! Startup orchestration.
//!
//! # Order
//! 1. Config (file or built-in default), validated
//! 2. Prometheus exporter, when enabled
//! 3. Reload sources: file watcher (`--watch`) and SIGHUP
//! 4. Shutdown on SIGINT/SIGTERM
//! 5. Bind and serve, plain or TLS
//!
//! Any error before serving aborts the process.

use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{load_config, validate_config, ConfigError, SiteConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid address: {0}")]
    Address(#[from] AddrParseError),

    #[error("metrics exporter error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("config watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the server was asked to start.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Config file; `None` runs the built-in default site.
    pub config_path: Option<PathBuf>,
    /// Reload when the config file changes on disk.
    pub watch: bool,
}

/// Load the config file, or validate the built-in default when none is given.
pub fn load_site_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SiteConfig::default();
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Start every subsystem and serve until a shutdown signal arrives.
pub async fn run(config: SiteConfig, options: StartupOptions) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        pages = config.pages.len(),
        redirects = config.redirects.len(),
        tls = config.listener.tls.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let (update_tx, update_rx) = mpsc::unbounded_channel();

    // The watcher stops when this handle drops, so keep it until serve returns.
    let _watcher = match (&options.config_path, options.watch) {
        (Some(path), true) => Some(ConfigWatcher::new(path, update_tx.clone()).run()?),
        _ => None,
    };
    if let Some(path) = &options.config_path {
        signals::spawn_reload_on_hangup(path.clone(), update_tx.clone());
    }
    drop(update_tx);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_shutdown_on_signal(shutdown);

    let addr: SocketAddr = config.listener.bind_address.parse()?;
    let tls = config.listener.tls.clone();
    let server = HttpServer::new(config);

    match tls {
        Some(tls) => server.run_tls(addr, &tls, update_rx, server_shutdown).await?,
        None => {
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, update_rx, server_shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatcher and static mount
//! - Wire up middleware (request ID, tracing, timeout, limits, headers)
//! - Bind server to listener (plain or TLS)
//! - Dispatch requests through the route table
//! - Swap in new site snapshots on config reload
//!
//! # Design Decisions
//! - Listener, middleware and static mount settings apply at startup;
//!   a reload replaces the route table and page source only, and one that
//!   moves the static mount is rejected
//! - Shutdown stops accepting, then closes whatever is still open after
//!   `timeouts.shutdown_grace_secs`
//! - Readers load the current snapshot lock-free via `ArcSwap`

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{extract::State, http::request::Parts, response::Response, Router};
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ContentConfig, SiteConfig, TlsConfig};
use crate::content::{self, PageSource};
use crate::http::request::{self, RequestIdExt};
use crate::http::response;
use crate::observability::metrics;
use crate::routing::{RouteMatch, RouteTable};
use crate::security::{headers, limits};

/// Everything a reload replaces: the route table and the page source.
#[derive(Debug)]
pub struct SiteSnapshot {
    pub table: RouteTable,
    pub pages: Arc<dyn PageSource>,
}

impl SiteSnapshot {
    pub fn new(table: RouteTable, pages: Arc<dyn PageSource>) -> Self {
        Self { table, pages }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            RouteTable::from_config(config),
            content::source_from_config(&config.content),
        )
    }
}

/// Error type for a rejected reload.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("static mount is fixed at startup ({running}); reload asks for {requested}")]
    StaticMountChanged { running: String, requested: String },
}

/// Where the static directory is mounted; fixed for the life of the router.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StaticMount {
    dir: Option<PathBuf>,
    prefix: String,
}

impl StaticMount {
    fn from_content(content: &ContentConfig) -> Self {
        Self {
            dir: content.static_dir.clone(),
            prefix: content.static_prefix.clone(),
        }
    }
}

impl fmt::Display for StaticMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.dir {
            Some(dir) => write!(f, "{} at '{}'", dir.display(), self.prefix),
            None => write!(f, "no static dir, prefix '{}'", self.prefix),
        }
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<ArcSwap<SiteSnapshot>>,
    mount: Arc<StaticMount>,
}

impl AppState {
    pub fn new(snapshot: SiteSnapshot, content: &ContentConfig) -> Self {
        Self {
            site: Arc::new(ArcSwap::from_pointee(snapshot)),
            mount: Arc::new(StaticMount::from_content(content)),
        }
    }

    /// Replace the live site with one built from `config`.
    ///
    /// Page paths were validated against `config`'s static prefix, so a
    /// reload that moves the static mount is rejected and the current site
    /// stays live.
    pub fn apply_config(&self, config: &SiteConfig) -> Result<(), ReloadError> {
        let requested = StaticMount::from_content(&config.content);
        if requested != *self.mount {
            metrics::record_config_reload("rejected");
            return Err(ReloadError::StaticMountChanged {
                running: self.mount.to_string(),
                requested: requested.to_string(),
            });
        }

        let snapshot = SiteSnapshot::from_config(config);
        let routes = snapshot.table.len();
        self.site.store(Arc::new(snapshot));
        metrics::record_config_reload("applied");
        tracing::info!(routes, "Site configuration applied");
        Ok(())
    }
}

/// HTTP server for the site.
pub struct HttpServer {
    router: Router,
    config: SiteConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SiteConfig) -> Self {
        let snapshot = SiteSnapshot::from_config(&config);
        Self::with_snapshot(config, snapshot)
    }

    /// Create a server whose pages come from `pages` instead of the content config.
    pub fn with_page_source(config: SiteConfig, pages: Arc<dyn PageSource>) -> Self {
        let snapshot = SiteSnapshot::new(RouteTable::from_config(&config), pages);
        Self::with_snapshot(config, snapshot)
    }

    fn with_snapshot(config: SiteConfig, snapshot: SiteSnapshot) -> Self {
        tracing::info!(routes = snapshot.table.len(), "Route table loaded");
        let state = AppState::new(snapshot, &config.content);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        let mut router = Router::new().fallback(dispatch);

        if let Some(dir) = &config.content.static_dir {
            tracing::info!(
                static_dir = ?dir,
                prefix = %config.content.static_prefix,
                "Serving static assets"
            );
            router = router.nest_service(&config.content.static_prefix, ServeDir::new(dir));
        }

        let mut router = router.with_state(state);
        if config.security.enable_headers {
            router = headers::apply(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(request::set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(request::make_span))
                .layer(request::propagate_request_id_layer())
                .layer(limits::body_limit_layer(&config.security))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(limits::concurrency_limit_layer(&config.listener)),
        )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<SiteConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let listener = listener.into_std()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let updater = spawn_config_updater(self.state.clone(), config_updates);
        let handle = drain_on_shutdown(shutdown, self.shutdown_grace());

        axum_server::from_tcp(listener)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        updater.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        config_updates: mpsc::UnboundedReceiver<SiteConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let rustls = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let updater = spawn_config_updater(self.state.clone(), config_updates);
        let handle = drain_on_shutdown(shutdown, self.shutdown_grace());

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        updater.abort();
        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.config.timeouts.shutdown_grace_secs)
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared state, for applying config updates directly.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config the server was started with.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

/// Stop accepting on shutdown; connections still open after `grace` are closed.
fn drain_on_shutdown(mut shutdown: broadcast::Receiver<()>, grace: Duration) -> Handle {
    let handle = Handle::new();
    let trigger = handle.clone();
    tokio::spawn(async move {
        let _ = shutdown.recv().await;
        // a signal sent before the accept loop starts would otherwise be missed
        trigger.listening().await;
        tracing::info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining connections");
        trigger.graceful_shutdown(Some(grace));
    });
    handle
}

fn spawn_config_updater(
    state: AppState,
    mut updates: mpsc::UnboundedReceiver<SiteConfig>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            if let Err(e) = state.apply_config(&config) {
                tracing::error!(error = %e, "Reload rejected. Keeping current configuration.");
            }
        }
    })
}

/// Route-table dispatcher.
/// Serves the bound page, answers with the bound redirect, or 404s.
async fn dispatch(State(state): State<AppState>, parts: Parts) -> Response {
    let start = Instant::now();
    let site = state.site.load_full();
    let path = parts.uri.path();
    let method = parts.method.as_str();
    let request_id = parts.request_id();

    match site.table.lookup(path) {
        RouteMatch::Page { route, page } => {
            tracing::debug!(request_id = %request_id, path = %path, page = %page.name, "Serving page");
            let response = match site.pages.render(page).await {
                Ok(rendered) => response::page(rendered),
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        page = %page.name,
                        error = %e,
                        "Page source failed"
                    );
                    response::page_unavailable()
                }
            };
            metrics::record_request(method, response.status().as_u16(), route.label(), start);
            response
        }
        RouteMatch::Redirect { route, redirect } => {
            tracing::debug!(
                request_id = %request_id,
                path = %path,
                location = %redirect.location,
                permanent = redirect.permanent,
                "Redirecting"
            );
            metrics::record_redirect(&route.pattern, redirect.permanent);
            let response = response::redirect(redirect);
            metrics::record_request(method, response.status().as_u16(), route.label(), start);
            response
        }
        RouteMatch::NoMatch => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(method, 404, "none", start);
            response::not_found()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::header::{LOCATION, X_CONTENT_TYPE_OPTIONS};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_page_and_redirect() {
        let server = HttpServer::new(SiteConfig::default());

        let response = get(server.router(), "/misc/").await;
        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(response.headers()[LOCATION], "/misc.html");

        let response = get(server.router(), "/misc.html").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let server = HttpServer::new(SiteConfig::default());
        let response = get(server.router(), "/set-up").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_and_headers_on_response() {
        let server = HttpServer::new(SiteConfig::default());
        let response = get(server.router(), "/").await;
        assert!(response.headers().contains_key(request::X_REQUEST_ID));
        assert_eq!(response.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let mut config = SiteConfig::default();
        config.security.enable_headers = false;
        let server = HttpServer::new(config);
        let response = get(server.router(), "/").await;
        assert!(!response.headers().contains_key(X_CONTENT_TYPE_OPTIONS));
    }

    #[tokio::test]
    async fn test_apply_config_swaps_table() {
        let server = HttpServer::new(SiteConfig::default());
        assert_eq!(get(server.router(), "/careers").await.status(), StatusCode::MOVED_PERMANENTLY);

        let mut config = SiteConfig::default();
        config.pages.retain(|p| p.name != "careers");
        server.state().apply_config(&config).unwrap();

        assert_eq!(get(server.router(), "/careers").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(server.router(), "/careers.html").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(get(server.router(), "/misc.html").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_cannot_move_static_mount() {
        let mut config = SiteConfig::default();
        config.content.static_dir = Some("assets".into());
        let server = HttpServer::new(config.clone());

        // Page under the old prefix passes validation against the new one.
        let mut moved = config.clone();
        moved.content.static_prefix = "/assets".to_string();
        moved.pages[1].also_served_at.push("/static/careers.html".to_string());
        assert!(crate::config::validate_config(&moved).is_ok());

        let err = server.state().apply_config(&moved).unwrap_err();
        assert!(matches!(err, ReloadError::StaticMountChanged { .. }));
        let site = server.state().site.load();
        assert!(matches!(site.table.lookup("/static/careers.html"), RouteMatch::NoMatch));

        // Same mount, different pages: applied.
        let mut trimmed = config;
        trimmed.pages.retain(|p| p.name != "misc");
        server.state().apply_config(&trimmed).unwrap();
        assert_eq!(get(server.router(), "/misc.html").await.status(), StatusCode::NOT_FOUND);
    }
}

//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use marketing_site::config::SiteConfig;
use marketing_site::content::PageSource;
use marketing_site::http::HttpServer;
use marketing_site::lifecycle::Shutdown;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A server running on an ephemeral local port.
#[allow(dead_code)]
pub struct TestSite {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<SiteConfig>,
    pub server: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestSite {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the site with `config`, serving pages from its content config.
pub async fn start_site(config: SiteConfig) -> TestSite {
    start(HttpServer::new(config)).await
}

/// Start the site with `config`, serving pages from `pages`.
#[allow(dead_code)]
pub async fn start_site_with_pages(config: SiteConfig, pages: Arc<dyn PageSource>) -> TestSite {
    start(HttpServer::with_page_source(config, pages)).await
}

async fn start(server: HttpServer) -> TestSite {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (updates, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();

    let server = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    TestSite {
        addr,
        shutdown,
        updates,
        server,
    }
}

/// Client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

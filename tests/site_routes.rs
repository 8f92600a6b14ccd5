//! End-to-end checks of the production route table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use marketing_site::config::SiteConfig;
use marketing_site::content::{ContentError, Page, PageSource};
use marketing_site::routing::PageRef;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use tokio::sync::Notify;

mod common;

const PAGES: [&str; 4] = ["careers", "misc", "parents", "ordernow"];

#[tokio::test]
async fn test_legacy_paths_redirect_to_html() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    for name in PAGES {
        for legacy in [format!("/{name}"), format!("/{name}/")] {
            let res = client.get(site.url(&legacy)).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY, "{legacy}");
            assert_eq!(res.headers()[LOCATION], format!("/{name}.html").as_str());
        }
    }
}

#[tokio::test]
async fn test_redirects_land_on_pages() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    for name in PAGES {
        let res = client.get(site.url(&format!("/{name}/"))).send().await.unwrap();
        let location = res.headers()[LOCATION].to_str().unwrap().to_string();

        let followed = client.get(site.url(&location)).send().await.unwrap();
        assert_eq!(followed.status(), StatusCode::OK, "{location}");
        assert!(followed.headers().get(LOCATION).is_none());
    }
}

#[tokio::test]
async fn test_root_and_index_serve_the_same_page() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    let root = client.get(site.url("/")).send().await.unwrap();
    assert_eq!(root.status(), StatusCode::OK);
    assert_eq!(root.headers()[CONTENT_TYPE], "text/html; charset=utf-8");
    let root_body = root.text().await.unwrap();

    let index = client.get(site.url("/index.html")).send().await.unwrap();
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(index.text().await.unwrap(), root_body);
    assert!(root_body.contains("data-page=\"index\""));
}

#[tokio::test]
async fn test_misc_example() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    let res = client.get(site.url("/misc/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "/misc.html");

    let res = client.get(site.url("/misc.html")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_paths_are_404() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    for path in ["/hero-testing", "/set-up", "/careers.html/", "/index"] {
        let res = client.get(site.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_redirect_ignores_method_and_query() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    let res = client.post(site.url("/parents?ref=mail")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[LOCATION], "/parents.html");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();

    let res = client
        .get(site.url("/careers.html"))
        .header("x-request-id", "test-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "test-123");

    let res = client.get(site.url("/careers")).send().await.unwrap();
    assert!(!res.headers()["x-request-id"].is_empty());
}

#[tokio::test]
async fn test_pages_from_template_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("careers.html"), "<h1>We are hiring</h1>").unwrap();
    std::fs::write(dir.path().join("get_started.html"), "<h1>Get started</h1>").unwrap();

    let mut config = SiteConfig::default();
    config.content.pages_dir = Some(dir.path().to_path_buf());
    let site = common::start_site(config).await;
    let client = common::client();

    let res = client.get(site.url("/careers.html")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "<h1>We are hiring</h1>");

    let res = client.get(site.url("/ordernow.html")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "<h1>Get started</h1>");

    // Routed, but no template on disk.
    let res = client.get(site.url("/misc.html")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[derive(Debug)]
struct BrokenPages;

#[async_trait]
impl PageSource for BrokenPages {
    async fn render(&self, page: &PageRef) -> Result<Page, ContentError> {
        Err(ContentError::NotFound(page.template.clone()))
    }
}

#[tokio::test]
async fn test_page_failure_does_not_affect_redirects() {
    let site = common::start_site_with_pages(SiteConfig::default(), Arc::new(BrokenPages)).await;
    let client = common::client();

    let res = client.get(site.url("/parents.html")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let res = client.get(site.url("/parents")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn test_static_assets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js").join("script.js"), "console.log('hi');").unwrap();

    let mut config = SiteConfig::default();
    config.content.static_dir = Some(dir.path().to_path_buf());
    let site = common::start_site(config).await;
    let client = common::client();

    let res = client.get(site.url("/static/js/script.js")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "console.log('hi');");

    let res = client.get(site.url("/static/js/missing.js")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Routes still dispatch next to the static mount.
    let res = client.get(site.url("/misc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn test_graceful_shutdown() {
    let site = common::start_site(SiteConfig::default()).await;
    let client = common::client();
    assert_eq!(
        client.get(site.url("/")).send().await.unwrap().status(),
        StatusCode::OK
    );

    site.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), site.server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

/// Renders only after a long pause, announcing when a render starts.
#[derive(Debug)]
struct SlowPages {
    started: Arc<Notify>,
}

#[async_trait]
impl PageSource for SlowPages {
    async fn render(&self, page: &PageRef) -> Result<Page, ContentError> {
        self.started.notify_one();
        tokio::time::sleep(Duration::from_secs(20)).await;
        Err(ContentError::NotFound(page.template.clone()))
    }
}

#[tokio::test]
async fn test_shutdown_grace_bounds_in_flight_requests() {
    let mut config = SiteConfig::default();
    config.timeouts.request_secs = 60;
    config.timeouts.shutdown_grace_secs = 1;

    let started = Arc::new(Notify::new());
    let pages = Arc::new(SlowPages {
        started: started.clone(),
    });
    let site = common::start_site_with_pages(config, pages).await;

    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap();
    let url = site.url("/misc.html");
    let in_flight = tokio::spawn(async move { client.get(url).send().await });
    started.notified().await;

    site.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), site.server)
        .await
        .expect("server kept draining past the grace period")
        .unwrap();
    assert!(result.is_ok());

    // the connection was closed, not answered
    assert!(in_flight.await.unwrap().is_err());
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by method, status, route
//! - `site_request_duration_seconds` (histogram): latency by method, route
//! - `site_redirects_total` (counter): redirects by source path, permanence
//! - `site_config_reloads_total` (counter): reloads by outcome
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Route label is the route name, or its pattern when unnamed

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let method = method.to_string();
    let route = route.to_string();

    metrics::counter!(
        "site_requests_total",
        "method" => method.clone(),
        "status" => status.to_string(),
        "route" => route.clone()
    )
    .increment(1);

    metrics::histogram!(
        "site_request_duration_seconds",
        "method" => method,
        "route" => route
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a redirect issued for `from`.
pub fn record_redirect(from: &str, permanent: bool) {
    metrics::counter!(
        "site_redirects_total",
        "from" => from.to_string(),
        "permanent" => permanent.to_string()
    )
    .increment(1);
}

/// Record the outcome of a configuration reload.
pub fn record_config_reload(outcome: &'static str) {
    metrics::counter!("site_config_reloads_total", "outcome" => outcome).increment(1);
}

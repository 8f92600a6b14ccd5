//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.
//! An empty file yields the current production route table.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the site server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,

    /// Where page bodies and static assets come from.
    pub content: ContentConfig,

    /// Pages, in declaration order.
    pub pages: Vec<PageConfig>,

    /// Free-standing redirects, checked after all page routes.
    pub redirects: Vec<RedirectConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
            content: ContentConfig::default(),
            pages: default_pages(),
            redirects: Vec::new(),
        }
    }
}

/// The `.html` canonical layout with bare-path back-compat redirects.
fn default_pages() -> Vec<PageConfig> {
    let mut pages = vec![PageConfig {
        name: "index".to_string(),
        canonical: "/index.html".to_string(),
        also_served_at: vec!["/".to_string()],
        legacy: Vec::new(),
        template: None,
        title: Some("Home".to_string()),
    }];

    for (name, title) in [
        ("careers", "Careers"),
        ("misc", "Misc"),
        ("parents", "Parents"),
        ("ordernow", "Order Now"),
    ] {
        pages.push(PageConfig {
            name: name.to_string(),
            canonical: format!("/{name}.html"),
            also_served_at: Vec::new(),
            legacy: vec![format!("/{name}"), format!("/{name}/")],
            template: (name == "ordernow").then(|| "get_started".to_string()),
            title: Some(title.to_string()),
        });
    }

    pages
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 1024,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: PathBuf,

    /// Path to private key file (PEM).
    pub key_path: PathBuf,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Grace period for in-flight requests on shutdown, in seconds.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}

/// Content locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory holding `<template>.html` page bodies.
    /// When unset, pages are rendered from built-in placeholders.
    pub pages_dir: Option<PathBuf>,

    /// Directory of static assets (js, css, images).
    pub static_dir: Option<PathBuf>,

    /// URL prefix the static directory is mounted at.
    pub static_prefix: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            pages_dir: None,
            static_dir: None,
            static_prefix: "/static".to_string(),
        }
    }
}

/// A page with one canonical address.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    /// Page identifier, also used as the route name.
    pub name: String,

    /// Canonical path every legacy path redirects to.
    pub canonical: String,

    /// Additional paths that serve the page directly (no redirect).
    #[serde(default)]
    pub also_served_at: Vec<String>,

    /// Former addresses, answered with a permanent redirect to `canonical`.
    #[serde(default)]
    pub legacy: Vec<String>,

    /// Template name; defaults to `name`.
    #[serde(default)]
    pub template: Option<String>,

    /// Human title, used by built-in placeholder pages.
    #[serde(default)]
    pub title: Option<String>,
}

impl PageConfig {
    /// Template to render for this page.
    pub fn template_name(&self) -> &str {
        self.template.as_deref().unwrap_or(&self.name)
    }
}

/// A redirect not tied to a page's legacy list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedirectConfig {
    /// Path to match.
    pub from: String,

    /// Destination path or absolute URL.
    pub to: String,

    /// 301 when true, 302 otherwise.
    #[serde(default = "default_permanent")]
    pub permanent: bool,

    /// Optional route name.
    #[serde(default)]
    pub name: Option<String>,
}

fn default_permanent() -> bool {
    true
}

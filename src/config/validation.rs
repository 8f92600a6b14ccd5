//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (redirects land on served pages)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::SiteConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("path '{0}' must start with '/'")]
    RelativePath(String),

    #[error("static_prefix '{0}' must start with '/' and not end with '/'")]
    InvalidStaticPrefix(String),

    #[error("page name must not be empty")]
    EmptyPageName,

    #[error("page '{0}' is declared more than once")]
    DuplicatePage(String),

    #[error("path '{path}' is bound by both '{first}' and '{second}'")]
    DuplicatePattern {
        path: String,
        first: String,
        second: String,
    },

    #[error("redirect '{from}' points to '{to}', which is not served by any page")]
    DanglingRedirect { from: String, to: String },

    #[error("route '{path}' is shadowed by the static prefix '{prefix}'")]
    ShadowedByStatic { path: String, prefix: String },

    #[error("tls {0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_listener(config, &mut errors);
    check_routes(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_listener(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroValue { field: "listener.max_connections" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "timeouts.request_secs" });
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue { field: "security.max_body_size" });
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }
}

fn check_routes(config: &SiteConfig, errors: &mut Vec<ValidationError>) {
    let prefix = &config.content.static_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidStaticPrefix(prefix.clone()));
    }

    let mut page_names = HashSet::new();
    // path -> owner label, for duplicate reporting
    let mut owners: HashMap<&str, String> = HashMap::new();
    let mut served: HashSet<&str> = HashSet::new();

    for page in &config.pages {
        if page.name.is_empty() {
            errors.push(ValidationError::EmptyPageName);
        } else if !page_names.insert(page.name.as_str()) {
            errors.push(ValidationError::DuplicatePage(page.name.clone()));
        }

        let direct = std::iter::once(&page.canonical).chain(&page.also_served_at);
        for path in direct {
            claim(path, format!("page '{}'", page.name), &mut owners, errors);
            served.insert(path.as_str());
        }
        for path in &page.legacy {
            claim(path, format!("legacy path of '{}'", page.name), &mut owners, errors);
        }
    }

    for redirect in &config.redirects {
        claim(&redirect.from, format!("redirect to '{}'", redirect.to), &mut owners, errors);
    }

    for redirect in &config.redirects {
        if !is_external(&redirect.to) && !served.contains(redirect.to.as_str()) {
            errors.push(ValidationError::DanglingRedirect {
                from: redirect.from.clone(),
                to: redirect.to.clone(),
            });
        }
    }

    if prefix.starts_with('/') && !prefix.ends_with('/') {
        let nested = format!("{prefix}/");
        let mut shadowed: Vec<&str> = owners
            .keys()
            .copied()
            .filter(|path| *path == prefix.as_str() || path.starts_with(&nested))
            .collect();
        shadowed.sort_unstable();
        for path in shadowed {
            errors.push(ValidationError::ShadowedByStatic {
                path: path.to_string(),
                prefix: prefix.clone(),
            });
        }
    }
}

/// Record `owner` as the binder of `path`, reporting malformed or duplicate paths.
fn claim<'a>(
    path: &'a str,
    owner: String,
    owners: &mut HashMap<&'a str, String>,
    errors: &mut Vec<ValidationError>,
) {
    if !path.starts_with('/') {
        errors.push(ValidationError::RelativePath(path.to_string()));
        return;
    }
    match owners.get(path) {
        Some(first) => errors.push(ValidationError::DuplicatePattern {
            path: path.to_string(),
            first: first.clone(),
            second: owner,
        }),
        None => {
            owners.insert(path, owner);
        }
    }
}

/// Absolute URLs leave the site and are not checked against the table.
pub(crate) fn is_external(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

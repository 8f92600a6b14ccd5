//! Route definitions.

use std::fmt;

use axum::http::StatusCode;
use serde::Serialize;

/// Opaque reference to the logic that renders a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRef {
    /// Page identifier.
    pub name: String,
    /// Template the page source renders.
    pub template: String,
    /// Human title, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Where a redirect sends the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectSpec {
    /// Destination path or absolute URL, sent verbatim as `Location`.
    pub location: String,
    /// 301 when true, 302 otherwise.
    pub permanent: bool,
}

impl RedirectSpec {
    pub fn permanent(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            permanent: true,
        }
    }

    pub fn temporary(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            permanent: false,
        }
    }

    /// Status code sent with this redirect.
    pub fn status(&self) -> StatusCode {
        if self.permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        }
    }
}

/// What a matched route does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Target {
    /// Serve a page.
    Page(PageRef),
    /// Answer with a redirect.
    Redirect(RedirectSpec),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Page(page) => write!(f, "page {} ({}.html)", page.name, page.template),
            Target::Redirect(redirect) => {
                write!(f, "{} -> {}", redirect.status().as_u16(), redirect.location)
            }
        }
    }
}

/// A single (pattern, target) binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Exact request path this route answers.
    pub pattern: String,
    /// Handler or redirect.
    pub target: Target,
    /// Route identifier for logging/metrics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Route {
    pub fn page(pattern: impl Into<String>, page: PageRef, name: Option<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: Target::Page(page),
            name,
        }
    }

    pub fn redirect(pattern: impl Into<String>, redirect: RedirectSpec, name: Option<String>) -> Self {
        Self {
            pattern: pattern.into(),
            target: Target::Redirect(redirect),
            name,
        }
    }

    /// Label used for metrics; unnamed routes report their pattern.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_status() {
        assert_eq!(
            RedirectSpec::permanent("/misc.html").status(),
            StatusCode::MOVED_PERMANENTLY
        );
        assert_eq!(RedirectSpec::temporary("/misc.html").status(), StatusCode::FOUND);
    }

    #[test]
    fn test_route_label() {
        let named = Route::redirect("/misc", RedirectSpec::permanent("/misc.html"), Some("old-misc".into()));
        assert_eq!(named.label(), "old-misc");

        let unnamed = Route::redirect("/misc/", RedirectSpec::permanent("/misc.html"), None);
        assert_eq!(unnamed.label(), "/misc/");
    }

    #[test]
    fn test_target_display() {
        let redirect = Target::Redirect(RedirectSpec::permanent("/careers.html"));
        assert_eq!(redirect.to_string(), "301 -> /careers.html");

        let page = Target::Page(PageRef {
            name: "ordernow".into(),
            template: "get_started".into(),
            title: None,
        });
        assert_eq!(page.to_string(), "page ordernow (get_started.html)");
    }

    #[test]
    fn test_serialized_shape() {
        let route = Route::redirect("/misc/", RedirectSpec::permanent("/misc.html"), None);
        let json = serde_json::to_value(&route).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "pattern": "/misc/",
                "target": { "kind": "redirect", "location": "/misc.html", "permanent": true }
            })
        );
    }
}

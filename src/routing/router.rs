//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Look up the route bound to a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact-path lookup via HashMap
//! - First declaration of a pattern wins
//! - Paths are matched verbatim: no trailing-slash or case folding

use std::collections::HashMap;

use crate::config::SiteConfig;
use crate::routing::route::{PageRef, RedirectSpec, Route, Target};

/// Result of a route lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// The path is served by a page.
    Page { route: &'a Route, page: &'a PageRef },
    /// The path answers with a redirect.
    Redirect { route: &'a Route, redirect: &'a RedirectSpec },
    /// Nothing is bound to the path.
    NoMatch,
}

/// Compiled, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_pattern: HashMap<String, usize>,
}

impl RouteTable {
    /// Build a table from routes in declaration order.
    pub fn new(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut table = Self::default();
        for route in routes {
            table.push(route);
        }
        table
    }

    fn push(&mut self, route: Route) {
        if let Some(&existing) = self.by_pattern.get(&route.pattern) {
            tracing::warn!(
                pattern = %route.pattern,
                kept = %self.routes[existing].label(),
                skipped = %route.label(),
                "Duplicate route pattern, keeping first declaration"
            );
            return;
        }
        self.by_pattern.insert(route.pattern.clone(), self.routes.len());
        self.routes.push(route);
    }

    /// Compile the table described by a configuration.
    ///
    /// Each page contributes its canonical path, then its extra served paths,
    /// then its legacy paths as permanent redirects to the canonical path.
    /// Free-standing redirects follow all pages.
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut routes = Vec::new();

        for page in &config.pages {
            let page_ref = PageRef {
                name: page.name.clone(),
                template: page.template_name().to_string(),
                title: page.title.clone(),
            };

            routes.push(Route::page(&page.canonical, page_ref.clone(), Some(page.name.clone())));
            for path in &page.also_served_at {
                routes.push(Route::page(path, page_ref.clone(), None));
            }
            for path in &page.legacy {
                routes.push(Route::redirect(path, RedirectSpec::permanent(&page.canonical), None));
            }
        }

        for redirect in &config.redirects {
            let spec = RedirectSpec {
                location: redirect.to.clone(),
                permanent: redirect.permanent,
            };
            routes.push(Route::redirect(&redirect.from, spec, redirect.name.clone()));
        }

        let table = Self::new(routes);
        tracing::debug!(routes = table.len(), "Route table compiled");
        table
    }

    /// Find the route bound to `path`.
    pub fn lookup(&self, path: &str) -> RouteMatch<'_> {
        let Some(&index) = self.by_pattern.get(path) else {
            return RouteMatch::NoMatch;
        };
        let route = &self.routes[index];
        match &route.target {
            Target::Page(page) => RouteMatch::Page { route, page },
            Target::Redirect(redirect) => RouteMatch::Redirect { route, redirect },
        }
    }

    /// Canonical path of a named page, i.e. its named page route.
    pub fn canonical_path(&self, page_name: &str) -> Option<&str> {
        self.routes.iter().find_map(|route| match &route.target {
            Target::Page(page) if page.name == page_name && route.name.is_some() => {
                Some(route.pattern.as_str())
            }
            _ => None,
        })
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

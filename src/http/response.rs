//! Response construction.
//!
//! # Responsibilities
//! - Page bodies as `text/html`
//! - Redirects with the configured status and `Location`
//! - Plain-text not-found and failure responses
//!
//! # Design Decisions
//! - Permanent redirects are 301, not axum's 308
//! - `Location` is sent verbatim; the request query string is dropped

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::content::Page;
use crate::routing::RedirectSpec;

/// 200 with the page body.
pub fn page(page: Page) -> Response {
    Html(page.html).into_response()
}

/// 301/302 pointing at the redirect destination.
pub fn redirect(spec: &RedirectSpec) -> Response {
    match HeaderValue::from_str(&spec.location) {
        Ok(location) => (spec.status(), [(LOCATION, location)]).into_response(),
        Err(e) => {
            tracing::error!(location = %spec.location, error = %e, "Redirect location is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect").into_response()
        }
    }
}

/// 404 for paths with no route.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

/// 500 when a page source fails.
pub fn page_unavailable() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Page unavailable").into_response()
}

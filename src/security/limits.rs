//! Request limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Bound concurrent in-flight requests across the whole router
//!
//! # Design Decisions
//! - Oversized bodies are rejected with 413 Payload Too Large
//! - Excess requests wait for a slot rather than being shed

use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;

use crate::config::{ListenerConfig, SecurityConfig};

/// Body size limit from the security config.
pub fn body_limit_layer(config: &SecurityConfig) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(config.max_body_size)
}

/// In-flight request limit from the listener config.
///
/// The semaphore is shared by every route the layer is applied to.
pub fn concurrency_limit_layer(config: &ListenerConfig) -> GlobalConcurrencyLimitLayer {
    GlobalConcurrencyLimitLayer::new(config.max_connections)
}

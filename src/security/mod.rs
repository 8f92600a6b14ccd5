//! Security subsystem.
//!
//! # Components
//! - headers.rs: security response headers
//! - limits.rs: request body and concurrency limits
//!
//! # Design Decisions
//! - Applied as tower layers around the whole router
//! - Headers never override a value a handler already set

pub mod headers;
pub mod limits;

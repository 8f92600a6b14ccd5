//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact-path lookup)
//!     → Return: Page, Redirect or NoMatch
//!
//! Route Compilation (at startup and on reload):
//!     PageConfig[] + RedirectConfig[]
//!     → canonical, served and legacy paths per page
//!     → free-standing redirects
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled from config, immutable at runtime
//! - No regex, no prefix matching: every binding is an exact path
//! - Deterministic: same input always matches same route
//! - First declaration wins

pub mod route;
pub mod router;

pub use route::{PageRef, RedirectSpec, Route, Target};
pub use router::{RouteMatch, RouteTable};

//! Marketing site server.
//!
//! Serves a small set of server-rendered pages through a static route table.
//! Every page has one canonical `.html` path; former bare paths answer with
//! permanent redirects to it.

pub mod cli;
pub mod config;
pub mod content;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;

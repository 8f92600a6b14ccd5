//! Page content subsystem.
//!
//! Routes only hold a [`PageRef`]; producing the page body is the job of a
//! [`PageSource`]. The server holds one source per site snapshot.
//!
//! - `template_dir.rs`: `<pages_dir>/<template>.html` files on disk
//! - `builtin.rs`: generated placeholder pages, used when no directory is set

pub mod builtin;
pub mod template_dir;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ContentConfig;
use crate::routing::PageRef;

pub use builtin::BuiltinPages;
pub use template_dir::TemplateDir;

/// A rendered page body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub html: String,
}

/// Errors raised while producing a page.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("failed to read template '{template}': {source}")]
    Io {
        template: String,
        #[source]
        source: std::io::Error,
    },
}

/// Produces page bodies for matched page routes.
#[async_trait]
pub trait PageSource: Send + Sync + std::fmt::Debug {
    async fn render(&self, page: &PageRef) -> Result<Page, ContentError>;
}

/// Pick the page source described by the content configuration.
pub fn source_from_config(config: &ContentConfig) -> Arc<dyn PageSource> {
    match &config.pages_dir {
        Some(dir) => {
            tracing::info!(pages_dir = ?dir, "Serving pages from template directory");
            Arc::new(TemplateDir::new(dir))
        }
        None => {
            tracing::info!("No pages_dir configured, serving built-in pages");
            Arc::new(BuiltinPages)
        }
    }
}

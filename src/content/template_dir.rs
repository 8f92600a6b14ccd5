//! Pages read from a directory of HTML files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::content::{ContentError, Page, PageSource};
use crate::routing::PageRef;

/// Reads `<root>/<template>.html` on every request, so edits show up without a reload.
#[derive(Debug, Clone)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, template: &str) -> Option<PathBuf> {
        // Template names come from config, but never let one escape the root.
        if template.is_empty() || template.contains(['/', '\\']) || template.starts_with('.') {
            return None;
        }
        Some(self.root.join(format!("{template}.html")))
    }
}

#[async_trait]
impl PageSource for TemplateDir {
    async fn render(&self, page: &PageRef) -> Result<Page, ContentError> {
        let path = self
            .path_for(&page.template)
            .ok_or_else(|| ContentError::NotFound(page.template.clone()))?;

        match tokio::fs::read_to_string(&path).await {
            Ok(html) => Ok(Page { html }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ContentError::NotFound(page.template.clone()))
            }
            Err(source) => Err(ContentError::Io {
                template: page.template.clone(),
                source,
            }),
        }
    }
}

//! Generated placeholder pages.

use async_trait::async_trait;

use crate::content::{ContentError, Page, PageSource};
use crate::routing::PageRef;

/// Renders a bare HTML document per page. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPages;

#[async_trait]
impl PageSource for BuiltinPages {
    async fn render(&self, page: &PageRef) -> Result<Page, ContentError> {
        let title = escape(page.title.as_deref().unwrap_or(&page.name));
        let html = format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
             <body data-page=\"{name}\"><h1>{title}</h1></body>\n\
             </html>\n",
            name = escape(&page.name),
        );
        Ok(Page { html })
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

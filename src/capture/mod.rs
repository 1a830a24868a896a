//! # Capture layer
//!
//! Accumulates intercepted traffic into per-page element collections while
//! capture is armed.
//!
//! ## Module structure
//! - `assembler`: turns one intercepted request into a Link or Form
//! - `PageBuffer` (here): top-level-URL-keyed map of Pages under assembly,
//!   with an atomic flush

pub mod assembler;

pub use assembler::ElementAssembler;

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::model::{Page, PageElement, Resource};
use crate::{Error, Result};

/// Mapping from top-level URL to the Page being assembled for it
///
/// All operations take one write lock, so an append racing a flush either
/// lands in the flushed batch or in the next one, never in both and never
/// nowhere.
#[derive(Debug, Default)]
pub struct PageBuffer {
    pages: RwLock<HashMap<String, Page>>,
}

impl PageBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the Page for a top-level URL (idempotent)
    ///
    /// A freshly created Page is seeded with an empty resource stub; the
    /// stub is what a HEAD-only capture window leaves behind.
    pub fn ensure_page(&self, top_url: &str) -> Result<()> {
        self.record(top_url, None)
    }

    /// Get-or-create the Page for a top-level URL and append an element to
    /// it under a single write guard
    ///
    /// `element` is None for methods that contribute nothing; the page entry
    /// is materialized either way. The single lock keeps a concurrent flush
    /// from draining the page between creation and append: the element lands
    /// either in the flushed batch or in the next one, never nowhere.
    pub fn record(&self, top_url: &str, element: Option<PageElement>) -> Result<()> {
        let mut pages = self
            .pages
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let page = pages.entry(top_url.to_string()).or_insert_with(|| {
            debug!(url = top_url, "opening page entry");
            Page::new(Resource::stub(top_url))
        });

        match element {
            Some(PageElement::Link(link)) => page.links.push(link),
            Some(PageElement::Form(form)) => page.forms.push(form),
            None => {}
        }

        Ok(())
    }

    /// Append an element to the Page for a top-level URL
    ///
    /// Callers guarantee the Page exists via `ensure_page`.
    pub fn append(&self, top_url: &str, element: PageElement) -> Result<()> {
        let mut pages = self
            .pages
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let page = pages
            .get_mut(top_url)
            .ok_or_else(|| Error::page_not_found(top_url))?;

        match element {
            PageElement::Link(link) => page.links.push(link),
            PageElement::Form(form) => page.forms.push(form),
        }

        Ok(())
    }

    /// Return all buffered Pages and clear the buffer in one atomic step
    pub fn flush(&self) -> Result<Vec<Page>> {
        let mut pages = self
            .pages
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?;

        let flushed: Vec<Page> = std::mem::take(&mut *pages).into_values().collect();
        debug!(count = flushed.len(), "flushed page buffer");
        Ok(flushed)
    }

    /// Number of Pages currently buffered
    pub fn len(&self) -> usize {
        self.pages.read().map(|p| p.len()).unwrap_or(0)
    }

    /// Whether the buffer holds no Pages
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Resource store
//!
//! Keyed stores mapping a URL to a previously-obtained resource snapshot.
//! Two stores with different consumption semantics:
//! - **preload**: consumed (removed) on first successful lookup, so each
//!   entry substitutes at most one request.
//! - **cache**: persists across lookups until explicitly replaced.
//!
//! Resolution tries preload first, then cache; a preload hit removes only
//! the preload entry and leaves any cache entry untouched.

use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::model::Resource;
use crate::{Error, Result};

/// Outcome of resolving a request URL against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Satisfied by a preload entry, now consumed
    Preload(Resource),
    /// Satisfied by a cache entry, left in place
    Cache(Resource),
    /// No stored resource for this URL
    Miss,
}

/// Preload and cache stores for resource substitution
#[derive(Debug, Default)]
pub struct ResourceStore {
    preload: RwLock<HashMap<String, Resource>>,
    cache: RwLock<HashMap<String, Resource>>,
}

impl ResourceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a one-shot preload entry, replacing any existing one for the URL
    pub fn preload(&self, resource: Resource) -> Result<()> {
        debug!(url = %resource.url, "preloading resource");
        self.preload
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(resource.url.clone(), resource);
        Ok(())
    }

    /// Atomically look up and remove the preload entry for a URL
    ///
    /// The check-and-remove happens under one write lock; concurrent callers
    /// racing for the same URL see it consumed by exactly one of them.
    pub fn consume_preload(&self, url: &str) -> Result<Option<Resource>> {
        Ok(self
            .preload
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .remove(url))
    }

    /// Insert or replace a persistent cache entry
    pub fn cache(&self, resource: Resource) -> Result<()> {
        debug!(url = %resource.url, "caching resource");
        self.cache
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .insert(resource.url.clone(), resource);
        Ok(())
    }

    /// Non-destructive cache lookup
    pub fn get_cached(&self, url: &str) -> Result<Option<Resource>> {
        Ok(self
            .cache
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .get(url)
            .cloned())
    }

    /// Enumerate current cache contents (no ordering guarantee)
    pub fn all_cached(&self) -> Result<Vec<Resource>> {
        Ok(self
            .cache
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .values()
            .cloned()
            .collect())
    }

    /// Resolve a request URL: preload wins over cache, miss otherwise
    pub fn resolve(&self, url: &str) -> Result<Resolution> {
        if let Some(resource) = self.consume_preload(url)? {
            debug!(url, "resolved from preload");
            return Ok(Resolution::Preload(resource));
        }

        if let Some(resource) = self.get_cached(url)? {
            debug!(url, "resolved from cache");
            return Ok(Resolution::Cache(resource));
        }

        Ok(Resolution::Miss)
    }
}

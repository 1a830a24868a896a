//! Session collaborator traits
//!
//! Abstract interfaces for the external pieces a browser session composes:
//! the rendering engine, the intercepting proxy transport and the ambient
//! cookie source. The session only ever talks to these seams, so it can be
//! exercised end-to-end against the mocks in [`crate::session::mock`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::intercept::InterceptHandler;
use crate::model::{Cookie, Page, Resource};

/// What a `load` call targets
///
/// A plain URL hits the network as usual; a snapshot is preloaded first so
/// the navigation is satisfied from the store and the content is re-rendered
/// through the JS engine without a real fetch.
#[derive(Debug, Clone)]
pub enum LoadTarget {
    /// Navigate to a URL
    Url(String),
    /// Replay a previously-fetched resource
    Resource(Resource),
    /// Replay a previously-assembled page, restoring its cookies
    Page(Page),
}

impl From<&str> for LoadTarget {
    fn from(url: &str) -> Self {
        LoadTarget::Url(url.to_string())
    }
}

impl From<String> for LoadTarget {
    fn from(url: String) -> Self {
        LoadTarget::Url(url)
    }
}

impl From<Resource> for LoadTarget {
    fn from(resource: Resource) -> Self {
        LoadTarget::Resource(resource)
    }
}

impl From<Page> for LoadTarget {
    fn from(page: Page) -> Self {
        LoadTarget::Page(page)
    }
}

/// Rendering engine contract
///
/// A JavaScript/DOM-capable browser engine under programmatic control.
#[async_trait]
pub trait RenderingEngine: Send + Sync + std::fmt::Debug {
    /// Apply a user agent string
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), crate::Error>;

    /// Navigate to a URL
    ///
    /// Returns once navigation is dispatched; resulting traffic arrives
    /// asynchronously through the proxy transport.
    async fn navigate(&self, url: &str) -> Result<(), crate::Error>;

    /// Read the live evaluated HTML of the current document
    async fn rendered_html(&self) -> Result<String, crate::Error>;

    /// Add a cookie to the engine's cookie store
    async fn add_cookie(&self, cookie: &Cookie) -> Result<(), crate::Error>;

    /// Read the engine's cookie store
    async fn cookies(&self) -> Result<Vec<Cookie>, crate::Error>;

    /// Shut the engine down; it issues no requests afterwards
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if the engine is running
    fn is_active(&self) -> bool;
}

/// Intercepting proxy transport contract
///
/// Routes every request the rendering engine issues through an
/// [`InterceptHandler`], once per request/response pair.
#[async_trait]
pub trait ProxyTransport: Send + Sync + std::fmt::Debug {
    /// Start the asynchronous listener with the given interception hook
    async fn start(&self, handler: Arc<dyn InterceptHandler>) -> Result<(), crate::Error>;

    /// Stop the listener
    ///
    /// Must only be called after the rendering engine has ceased issuing
    /// requests.
    async fn stop(&self) -> Result<(), crate::Error>;

    /// Check if the listener is running
    fn is_active(&self) -> bool;
}

/// Ambient cookie source consumed before each navigation
///
/// Read-only here; modeled as an injected dependency rather than a process
/// global so sessions are testable in isolation.
pub trait CookieSource: Send + Sync + std::fmt::Debug {
    /// Enumerate the cookies to seed into the engine jar
    fn cookies(&self) -> Vec<Cookie>;
}

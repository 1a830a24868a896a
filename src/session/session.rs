//! Browser session implementation
//!
//! Composes the traffic interceptor with the external rendering engine and
//! proxy transport. Public entry point for navigation, resource substitution,
//! capture control and page snapshots.

use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::capture::PageBuffer;
use crate::intercept::{InterceptHandler, TrafficInterceptor};
use crate::model::{Cookie, Page, Resource};
use crate::session::traits::{CookieSource, LoadTarget, ProxyTransport, RenderingEngine};
use crate::store::ResourceStore;
use crate::Result;

/// A crawling browser session
///
/// Owns exactly one resource store and one page buffer for its whole life;
/// both are reached through the interceptor the proxy transport calls into.
#[derive(Debug)]
pub struct BrowserSession {
    id: String,
    config: Config,
    engine: Arc<dyn RenderingEngine>,
    transport: Arc<dyn ProxyTransport>,
    cookie_source: Arc<dyn CookieSource>,
    interceptor: Arc<TrafficInterceptor>,
}

impl BrowserSession {
    /// Create a session over the given collaborators
    pub fn new(
        engine: Arc<dyn RenderingEngine>,
        transport: Arc<dyn ProxyTransport>,
        cookie_source: Arc<dyn CookieSource>,
        config: Config,
    ) -> Self {
        let store = Arc::new(ResourceStore::new());
        let buffer = Arc::new(PageBuffer::new());
        let interceptor = Arc::new(TrafficInterceptor::new(store, buffer));
        interceptor.set_capturing(config.capture_on_start);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config,
            engine,
            transport,
            cookie_source,
            interceptor,
        }
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Configure the engine and start the intercepting proxy listener
    pub async fn start(&self) -> Result<()> {
        self.engine.set_user_agent(&self.config.user_agent).await?;

        let handler: Arc<dyn InterceptHandler> = self.interceptor.clone();
        self.transport.start(handler).await?;

        info!(session = %self.id, "session started");
        Ok(())
    }

    /// Navigate to a target
    ///
    /// A URL target hits the network; a Resource or Page target is preloaded
    /// first so the navigation is satisfied from the store and the content is
    /// re-rendered through the JS engine. The top-level URL is fully updated
    /// before the engine starts issuing requests for the new target.
    pub async fn load<T: Into<LoadTarget>>(&self, target: T) -> Result<()> {
        let (url, snapshot_cookies) = match target.into() {
            LoadTarget::Url(url) => (url, Vec::new()),
            LoadTarget::Resource(resource) => {
                let url = resource.url.clone();
                self.interceptor.store().preload(resource)?;
                (url, Vec::new())
            }
            LoadTarget::Page(page) => {
                let url = page.resource.url.clone();
                self.interceptor.store().preload(page.resource)?;
                (url, page.cookies)
            }
        };

        self.interceptor.set_top_level_url(&url)?;

        // Restore snapshot cookies, then seed the ambient jar
        for cookie in snapshot_cookies.iter().chain(self.cookie_source.cookies().iter()) {
            self.engine.add_cookie(cookie).await?;
        }

        info!(session = %self.id, url = %url, "navigating");
        self.engine.navigate(&url).await
    }

    /// Store a one-shot preload entry
    pub fn preload(&self, resource: Resource) -> Result<()> {
        self.interceptor.store().preload(resource)
    }

    /// Store a persistent cache entry
    pub fn cache(&self, resource: Resource) -> Result<()> {
        self.interceptor.store().cache(resource)
    }

    /// Enumerate currently cached resources
    pub fn cached(&self) -> Result<Vec<Resource>> {
        self.interceptor.store().all_cached()
    }

    /// Arm traffic capture
    pub fn start_capture(&self) {
        debug!(session = %self.id, "capture armed");
        self.interceptor.set_capturing(true);
    }

    /// Disarm traffic capture
    pub fn stop_capture(&self) {
        debug!(session = %self.id, "capture disarmed");
        self.interceptor.set_capturing(false);
    }

    /// Whether capture is armed
    pub fn is_capturing(&self) -> bool {
        self.interceptor.is_capturing()
    }

    /// Return all captured pages and clear the buffer
    pub fn flush_pages(&self) -> Result<Vec<Page>> {
        self.interceptor.buffer().flush()
    }

    /// Snapshot the current response into a Page
    ///
    /// None when no request has been satisfied from the store yet. The page
    /// body is the engine's live rendered HTML, not the stored body, and its
    /// cookies are the union of the response's own Set-Cookie cookies and
    /// the live engine jar.
    pub async fn to_page(&self) -> Result<Option<Page>> {
        let Some(mut resource) = self.interceptor.current_response()? else {
            return Ok(None);
        };

        resource.body = Bytes::from(self.engine.rendered_html().await?);

        let mut cookies = resource.set_cookies();
        for live in self.engine.cookies().await? {
            let known = cookies
                .iter()
                .any(|c| c.name == live.name && c.domain == live.domain);
            if !known {
                cookies.push(live);
            }
        }

        let mut page = Page::new(resource);
        page.cookies = cookies;
        Ok(Some(page))
    }

    /// Read the engine's cookie store, stamped with the current URL
    ///
    /// Cookies the driver returns without a domain are attributed to the
    /// current top-level URL.
    pub async fn cookies(&self) -> Result<Vec<Cookie>> {
        let current = self.interceptor.top_level_url()?.unwrap_or_default();

        let mut cookies = self.engine.cookies().await?;
        for cookie in &mut cookies {
            if cookie.domain.is_empty() {
                cookie.domain = current.clone();
            }
        }

        Ok(cookies)
    }

    /// Shut the session down
    ///
    /// The engine stops first so no interception callback can land in a
    /// session that is mid-teardown; only then is the proxy listener stopped.
    pub async fn close(&self) -> Result<()> {
        self.engine.close().await?;
        self.transport.stop().await?;
        info!(session = %self.id, "session closed");
        Ok(())
    }
}

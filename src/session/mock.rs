//! Mock collaborators for testing
//!
//! In-memory implementations of the rendering engine, proxy transport and
//! ambient cookie source, so sessions can be exercised end-to-end without a
//! browser or a listening proxy.

use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::intercept::{InterceptHandler, InterceptedRequest, InterceptedResponse};
use crate::model::Cookie;
use crate::session::traits::{CookieSource, ProxyTransport, RenderingEngine};
use crate::Error;

/// Mock rendering engine
///
/// Records navigations, serves a settable rendered-HTML string and keeps an
/// in-memory cookie jar.
#[derive(Debug)]
pub struct MockRenderingEngine {
    user_agent: Mutex<Option<String>>,
    navigations: Mutex<Vec<String>>,
    html: Mutex<String>,
    jar: Mutex<Vec<Cookie>>,
    is_active: AtomicBool,
}

impl MockRenderingEngine {
    /// Create a new mock engine
    pub fn new() -> Self {
        Self {
            user_agent: Mutex::new(None),
            navigations: Mutex::new(Vec::new()),
            html: Mutex::new(String::new()),
            jar: Mutex::new(Vec::new()),
            is_active: AtomicBool::new(true),
        }
    }

    /// Set the HTML `rendered_html` will return
    pub async fn set_rendered_html<S: Into<String>>(&self, html: S) {
        *self.html.lock().await = html.into();
    }

    /// URLs navigated to, in order
    pub async fn navigations(&self) -> Vec<String> {
        self.navigations.lock().await.clone()
    }

    /// The user agent last applied, if any
    pub async fn user_agent(&self) -> Option<String> {
        self.user_agent.lock().await.clone()
    }

    fn check_active(&self) -> Result<(), Error> {
        if self.is_active.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(Error::engine("Engine is closed"))
        }
    }
}

impl Default for MockRenderingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RenderingEngine for MockRenderingEngine {
    async fn set_user_agent(&self, user_agent: &str) -> Result<(), Error> {
        self.check_active()?;
        *self.user_agent.lock().await = Some(user_agent.to_string());
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), Error> {
        self.check_active()?;
        self.navigations.lock().await.push(url.to_string());
        Ok(())
    }

    async fn rendered_html(&self) -> Result<String, Error> {
        self.check_active()?;
        Ok(self.html.lock().await.clone())
    }

    async fn add_cookie(&self, cookie: &Cookie) -> Result<(), Error> {
        self.check_active()?;
        let mut jar = self.jar.lock().await;
        jar.retain(|c| !(c.name == cookie.name && c.domain == cookie.domain));
        jar.push(cookie.clone());
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>, Error> {
        self.check_active()?;
        Ok(self.jar.lock().await.clone())
    }

    async fn close(&self) -> Result<(), Error> {
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// Mock proxy transport
///
/// Stores the interception hook and lets tests drive synthetic requests
/// through it the way the real listener would.
#[derive(Default)]
pub struct MockProxyTransport {
    handler: Mutex<Option<Arc<dyn InterceptHandler>>>,
    is_active: AtomicBool,
}

impl fmt::Debug for MockProxyTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProxyTransport")
            .field("is_active", &self.is_active.load(Ordering::Relaxed))
            .finish()
    }
}

impl MockProxyTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one synthetic request through the stored handler
    ///
    /// Returns the handler's forward decision and the response descriptor it
    /// may have populated.
    pub async fn drive(
        &self,
        request: &InterceptedRequest,
    ) -> Result<(bool, InterceptedResponse), Error> {
        let handler = self
            .handler
            .lock()
            .await
            .clone()
            .ok_or_else(|| Error::transport("Transport not started"))?;

        let mut response = InterceptedResponse::default();
        let forward = handler.intercept(request, &mut response).await;
        Ok((forward, response))
    }
}

#[async_trait]
impl ProxyTransport for MockProxyTransport {
    async fn start(&self, handler: Arc<dyn InterceptHandler>) -> Result<(), Error> {
        *self.handler.lock().await = Some(handler);
        self.is_active.store(true, Ordering::Relaxed);
        Ok(())
    }

    async fn stop(&self) -> Result<(), Error> {
        *self.handler.lock().await = None;
        self.is_active.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }
}

/// Fixed-content ambient cookie source
#[derive(Debug, Default)]
pub struct StaticCookieSource {
    cookies: Vec<Cookie>,
}

impl StaticCookieSource {
    /// Create a source over a fixed cookie list
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }
}

impl CookieSource for StaticCookieSource {
    fn cookies(&self) -> Vec<Cookie> {
        self.cookies.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_engine_records_navigations() {
        let engine = MockRenderingEngine::new();
        engine.navigate("http://a.com").await.unwrap();
        engine.navigate("http://b.com").await.unwrap();
        assert_eq!(engine.navigations().await.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_engine_rejects_calls_after_close() {
        let engine = MockRenderingEngine::new();
        engine.close().await.unwrap();

        let result = engine.navigate("http://a.com").await;
        assert!(matches!(result.unwrap_err(), Error::Engine(_)));
    }

    #[tokio::test]
    async fn test_mock_engine_jar_replaces_same_cookie() {
        let engine = MockRenderingEngine::new();
        engine
            .add_cookie(&Cookie::new("sid", "1", "http://ex.com"))
            .await
            .unwrap();
        engine
            .add_cookie(&Cookie::new("sid", "2", "http://ex.com"))
            .await
            .unwrap();

        let jar = engine.cookies().await.unwrap();
        assert_eq!(jar.len(), 1);
        assert_eq!(jar[0].value, "2");
    }

    #[tokio::test]
    async fn test_mock_transport_requires_start() {
        let transport = MockProxyTransport::new();
        let result = transport.drive(&InterceptedRequest::get("http://ex.com")).await;
        assert!(matches!(result.unwrap_err(), Error::Transport(_)));
    }
}

//! # Traffic interception
//!
//! The per-request decision function invoked by the proxy transport. For
//! every intercepted request/response pair it:
//! 1. resolves the URL against the resource store and, on a hit, populates
//!    the live response from the snapshot instead of forwarding;
//! 2. on a miss with capture armed, attributes the request to the current
//!    top-level URL and assembles it into the page buffer;
//! 3. tells the transport whether to forward the request to the real origin.
//!
//! The boolean returned through [`InterceptHandler`] is the sole channel
//! back to the transport: `true` means forward, `false` means the response
//! descriptor has already been populated.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

use crate::capture::{ElementAssembler, PageBuffer};
use crate::model::{Method, Resource};
use crate::store::{Resolution, ResourceStore};
use crate::{Error, Result};

/// Descriptor of one intercepted request
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    /// Request URL
    pub url: String,
    /// Request method
    pub method: Method,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body
    pub body: Bytes,
}

impl InterceptedRequest {
    /// Build a GET request descriptor
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a POST request descriptor with a body
    pub fn post<S: Into<String>, B: Into<Bytes>>(url: S, body: B) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            headers: HashMap::new(),
            body: body.into(),
        }
    }
}

/// Mutable response descriptor populated by the handler on a store hit
#[derive(Debug, Clone, Default)]
pub struct InterceptedResponse {
    pub url: String,
    pub status: u16,
    pub body: Bytes,
    pub headers: HashMap<String, String>,
    pub remote_addr: Option<String>,
    pub return_code: u32,
    pub return_message: String,
    pub raw_headers: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub http_version: String,
}

impl InterceptedResponse {
    /// Copy every field of a resource snapshot into this live response
    pub fn load_from(&mut self, resource: &Resource) {
        self.url = resource.url.clone();
        self.status = resource.status;
        self.body = resource.body.clone();
        self.headers = resource.headers.clone();
        self.remote_addr = resource.remote_addr.clone();
        self.return_code = resource.return_code;
        self.return_message = resource.return_message.clone();
        self.raw_headers = resource.raw_headers.clone();
        self.started_at = resource.started_at;
        self.finished_at = resource.finished_at;
        self.http_version = resource.http_version.clone();
    }
}

impl From<InterceptedResponse> for Resource {
    fn from(response: InterceptedResponse) -> Self {
        Resource {
            url: response.url,
            status: response.status,
            body: response.body,
            headers: response.headers,
            remote_addr: response.remote_addr,
            return_code: response.return_code,
            return_message: response.return_message,
            raw_headers: response.raw_headers,
            started_at: response.started_at,
            finished_at: response.finished_at,
            http_version: response.http_version,
        }
    }
}

/// Outcome of handling one intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptDecision {
    /// Forward the request to the real origin
    Forward,
    /// The response descriptor has been populated; do not forward
    Satisfied,
}

impl InterceptDecision {
    /// The bare boolean the proxy transport contract expects
    pub fn forward(self) -> bool {
        self == InterceptDecision::Forward
    }
}

/// Handler invoked by the proxy transport once per request/response pair
///
/// Returns `true` to forward the request to the real origin; `false` means
/// the response descriptor has already been populated by the handler.
#[async_trait]
pub trait InterceptHandler: Send + Sync {
    async fn intercept(
        &self,
        request: &InterceptedRequest,
        response: &mut InterceptedResponse,
    ) -> bool;
}

/// The per-request decision function composed from store, assembler and buffer
#[derive(Debug)]
pub struct TrafficInterceptor {
    store: Arc<ResourceStore>,
    buffer: Arc<PageBuffer>,
    assembler: ElementAssembler,
    capturing: AtomicBool,
    top_level_url: RwLock<Option<String>>,
    current_response: Mutex<Option<Resource>>,
}

impl TrafficInterceptor {
    /// Create an interceptor over a store and a page buffer
    pub fn new(store: Arc<ResourceStore>, buffer: Arc<PageBuffer>) -> Self {
        Self {
            store,
            buffer,
            assembler: ElementAssembler::new(),
            capturing: AtomicBool::new(false),
            top_level_url: RwLock::new(None),
            current_response: Mutex::new(None),
        }
    }

    /// The resource store consulted for substitution
    pub fn store(&self) -> &Arc<ResourceStore> {
        &self.store
    }

    /// The page buffer capture assembles into
    pub fn buffer(&self) -> &Arc<PageBuffer> {
        &self.buffer
    }

    /// Arm or disarm capture
    pub fn set_capturing(&self, armed: bool) {
        self.capturing.store(armed, Ordering::SeqCst);
    }

    /// Whether capture is currently armed
    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    /// Record the URL of the navigation all sub-requests are attributed to
    ///
    /// Written only by `load`, before the rendering engine starts issuing
    /// requests for the new target.
    pub fn set_top_level_url(&self, url: &str) -> Result<()> {
        *self
            .top_level_url
            .write()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))? = Some(url.to_string());
        Ok(())
    }

    /// The current top-level URL, if a navigation has happened
    pub fn top_level_url(&self) -> Result<Option<String>> {
        Ok(self
            .top_level_url
            .read()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .clone())
    }

    /// The resource that last satisfied a request from the store, if any
    pub fn current_response(&self) -> Result<Option<Resource>> {
        Ok(self
            .current_response
            .lock()
            .map_err(|e| Error::internal(format!("Lock error: {}", e)))?
            .clone())
    }

    /// Decide what to do with one intercepted request
    pub fn handle(
        &self,
        request: &InterceptedRequest,
        response: &mut InterceptedResponse,
    ) -> Result<InterceptDecision> {
        match self.store.resolve(&request.url)? {
            Resolution::Preload(resource) | Resolution::Cache(resource) => {
                response.load_from(&resource);
                *self
                    .current_response
                    .lock()
                    .map_err(|e| Error::internal(format!("Lock error: {}", e)))? = Some(resource);
                debug!(url = %request.url, "request satisfied from store");
                Ok(InterceptDecision::Satisfied)
            }
            Resolution::Miss => {
                if !self.is_capturing() {
                    return Ok(InterceptDecision::Forward);
                }

                // A request before any navigation is attributed to itself
                let top_url = self
                    .top_level_url()?
                    .unwrap_or_else(|| request.url.clone());

                // Every request in an armed window materializes a page entry,
                // even for methods that contribute no element. Page creation
                // and append happen under one buffer lock so a concurrent
                // flush cannot drain the page in between.
                let element = self.assembler.assemble(&top_url, request);
                if element.is_some() {
                    debug!(url = %request.url, method = %request.method, page = %top_url, "captured element");
                }
                self.buffer.record(&top_url, element)?;

                // Capture only observes; the request still goes to the wire
                Ok(InterceptDecision::Forward)
            }
        }
    }
}

#[async_trait]
impl InterceptHandler for TrafficInterceptor {
    async fn intercept(
        &self,
        request: &InterceptedRequest,
        response: &mut InterceptedResponse,
    ) -> bool {
        match self.handle(request, response) {
            Ok(decision) => decision.forward(),
            Err(e) => {
                warn!(url = %request.url, error = %e, "interception failed, forwarding request");
                true
            }
        }
    }
}

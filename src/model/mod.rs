//! # Data model
//!
//! Snapshot and page-element types shared across the store, capture and
//! session layers.
//!
//! ## Core concepts
//! - **Resource**: snapshot of one HTTP exchange (status, body, headers,
//!   timing). Created by an external fetch, by explicit preload/cache calls,
//!   or by copying from a resolved store entry.
//! - **Page**: a top-level Resource plus the Links, Forms and Cookies
//!   discovered while assembling it. Identity is the top-level URL.
//! - **Link / Form**: navigational elements reconstructed from intercepted
//!   traffic, attributed to the page that triggered them.

pub mod forms;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Head,
    Put,
    Delete,
    Options,
    Patch,
    Other(String),
}

impl Method {
    /// Parse a method from its wire representation (case-insensitive)
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "HEAD" => Method::Head,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Head => write!(f, "HEAD"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Patch => write!(f, "PATCH"),
            Method::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Snapshot of one HTTP exchange
///
/// Immutable once captured, except when explicitly overwritten by a
/// resolution copy or by `to_page` swapping in the rendered body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Request URL
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Bytes,
    /// Response headers
    pub headers: HashMap<String, String>,
    /// Origin server IP, if known
    pub remote_addr: Option<String>,
    /// Low-level transport return code
    pub return_code: u32,
    /// Low-level transport return message
    pub return_message: String,
    /// Raw header text as received off the wire
    pub raw_headers: String,
    /// Fetch start time
    pub started_at: Option<DateTime<Utc>>,
    /// Fetch completion time
    pub finished_at: Option<DateTime<Utc>>,
    /// Protocol version (e.g. "HTTP/1.1")
    pub http_version: String,
}

impl Resource {
    /// Create an empty stub resource for a URL
    ///
    /// Used to seed a Page entry before its top-level response is known.
    pub fn stub<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            status: 0,
            body: Bytes::new(),
            headers: HashMap::new(),
            remote_addr: None,
            return_code: 0,
            return_message: String::new(),
            raw_headers: String::new(),
            started_at: None,
            finished_at: None,
            http_version: String::new(),
        }
    }

    /// Cookies carried by this resource's own Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<Cookie> {
        self.headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .filter_map(|(_, value)| Cookie::parse_set_cookie(value, &self.url))
            .collect()
    }
}

/// A GET-style navigation discovered while assembling a Page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// URL of the page the link was discovered on
    pub page_url: String,
    /// Target URL of the navigation
    pub action_url: String,
}

/// A form submission discovered while assembling a Page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    /// URL of the page the form was discovered on
    pub page_url: String,
    /// Submission target URL
    pub action_url: String,
    /// Submission method
    pub method: Method,
    /// Form inputs decoded from the request body
    pub inputs: HashMap<String, String>,
}

/// Browser cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Domain or URL the cookie belongs to
    pub domain: String,
    pub path: String,
    /// Expiry as a unix timestamp, None for session cookies
    pub expires: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    /// Create a cookie with default attributes
    pub fn new<S: Into<String>>(name: S, value: S, domain: S) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Parse a Set-Cookie header value
    ///
    /// Unknown attributes are ignored; a header without a name=value pair
    /// yields None. Never errors.
    pub fn parse_set_cookie(header: &str, domain_url: &str) -> Option<Cookie> {
        let mut parts = header.split(';').map(str::trim);

        let (name, value) = parts.next()?.split_once('=')?;
        if name.is_empty() {
            return None;
        }

        let mut cookie = Cookie::new(name, value, domain_url);
        for attr in parts {
            match attr.split_once('=') {
                Some((key, val)) if key.eq_ignore_ascii_case("domain") => {
                    cookie.domain = val.trim().to_string();
                }
                Some((key, val)) if key.eq_ignore_ascii_case("path") => {
                    cookie.path = val.trim().to_string();
                }
                Some((key, val)) if key.eq_ignore_ascii_case("max-age") => {
                    if let Ok(secs) = val.trim().parse::<i64>() {
                        cookie.expires = Some(Utc::now().timestamp() + secs);
                    }
                }
                None if attr.eq_ignore_ascii_case("secure") => cookie.secure = true,
                None if attr.eq_ignore_ascii_case("httponly") => cookie.http_only = true,
                _ => {}
            }
        }

        Some(cookie)
    }
}

/// Aggregate of a top-level Resource plus its discovered elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Top-level navigation response
    pub resource: Resource,
    /// Discovered navigational links
    pub links: Vec<Link>,
    /// Discovered form submissions
    pub forms: Vec<Form>,
    /// Cookies associated with the page
    pub cookies: Vec<Cookie>,
}

impl Page {
    /// Create a page around a top-level resource with no elements yet
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            links: Vec::new(),
            forms: Vec::new(),
            cookies: Vec::new(),
        }
    }

    /// The top-level URL that identifies this page
    pub fn url(&self) -> &str {
        &self.resource.url
    }
}

/// A single element extracted from one intercepted request
#[derive(Debug, Clone, PartialEq)]
pub enum PageElement {
    Link(Link),
    Form(Form),
}

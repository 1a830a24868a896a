//! Common test utilities
//!
//! Shared fixtures for the integration suites: tracing setup, a fully wired
//! mock session and canned resource snapshots.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Once};

use bytes::Bytes;
use trawler::config::Config;
use trawler::model::{Cookie, Resource};
use trawler::session::mock::{MockProxyTransport, MockRenderingEngine, StaticCookieSource};
use trawler::session::BrowserSession;

static TRACING: Once = Once::new();

/// Initialise tracing once for the whole test binary
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A started session over mock collaborators, with handles on the mocks
pub struct TestSession {
    pub engine: Arc<MockRenderingEngine>,
    pub transport: Arc<MockProxyTransport>,
    pub session: BrowserSession,
}

/// Build and start a mock-backed session with no ambient cookies
pub async fn start_session() -> TestSession {
    start_session_with_ambient(Vec::new()).await
}

/// Build and start a mock-backed session seeded with ambient cookies
pub async fn start_session_with_ambient(ambient: Vec<Cookie>) -> TestSession {
    init_tracing();

    let engine = Arc::new(MockRenderingEngine::new());
    let transport = Arc::new(MockProxyTransport::new());
    let session = BrowserSession::new(
        engine.clone(),
        transport.clone(),
        Arc::new(StaticCookieSource::new(ambient)),
        Config::default(),
    );

    session.start().await.expect("session start failed");

    TestSession {
        engine,
        transport,
        session,
    }
}

/// A canned resource snapshot with a recognisable body
pub fn snapshot(url: &str, body: &str) -> Resource {
    Resource {
        status: 200,
        body: Bytes::from(body.to_string()),
        headers: HashMap::from([("Content-Type".to_string(), "text/html".to_string())]),
        remote_addr: Some("203.0.113.7".to_string()),
        return_message: "OK".to_string(),
        raw_headers: "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n".to_string(),
        http_version: "HTTP/1.1".to_string(),
        ..Resource::stub(url)
    }
}

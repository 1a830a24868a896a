//! # Session layer
//!
//! Public entry point of the library: a [`BrowserSession`] composes the
//! traffic interceptor with the external rendering engine and intercepting
//! proxy transport.
//!
//! ## Core operations
//! - **load**: navigate to a URL, or replay a previously-fetched snapshot
//!   through the JS engine without a network fetch
//! - **preload / cache**: stage resource substitutions for future requests
//! - **start_capture / stop_capture**: arm and disarm traffic recording
//! - **flush_pages**: drain the pages assembled from captured traffic
//! - **to_page**: snapshot the current response with the live rendered HTML
//!
//! ## Module structure
//! - `traits`: collaborator contracts (engine, transport, cookie source)
//! - `session`: the session implementation
//! - `mock`: in-memory collaborators for testing

pub mod mock;
pub mod session;
pub mod traits;

pub use session::BrowserSession;
pub use traits::{CookieSource, LoadTarget, ProxyTransport, RenderingEngine};

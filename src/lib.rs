//! Trawler: browser-driven traffic interception for web crawlers
//!
//! This library sits between a JavaScript-capable rendering engine and the
//! network. Every request the engine issues is routed through an intercepting
//! proxy hook, resolved against preloaded/cached resource snapshots, and,
//! while capture is armed, assembled into per-page link and form collections
//! for a crawler to consume.

pub mod error;
pub mod config;

pub mod model;
pub mod store;
pub mod capture;
pub mod intercept;
pub mod session;

// Re-exports
pub use error::{Error, Result};

/// Trawler library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

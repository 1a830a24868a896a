//! Configuration management for Trawler

use crate::{Error, Result};
use serde::Deserialize;
use std::env;

/// Session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// User agent applied to the rendering engine
    pub user_agent: String,

    /// Host the intercepting proxy binds to
    pub proxy_host: String,

    /// Port the intercepting proxy listens on
    pub proxy_port: u16,

    /// Arm traffic capture as soon as the session starts
    pub capture_on_start: bool,

    /// Default navigation timeout in milliseconds
    pub navigation_timeout: u64,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; Trawler/0.1)".to_string(),
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: 8444,
            capture_on_start: false,
            navigation_timeout: 30000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(user_agent) = env::var("TRAWLER_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(host) = env::var("TRAWLER_PROXY_HOST") {
            config.proxy_host = host;
        }

        if let Ok(port) = env::var("TRAWLER_PROXY_PORT") {
            config.proxy_port = port
                .parse()
                .map_err(|_| Error::configuration("Invalid TRAWLER_PROXY_PORT"))?;
        }

        if let Ok(capture) = env::var("TRAWLER_CAPTURE_ON_START") {
            config.capture_on_start = capture
                .parse()
                .map_err(|_| Error::configuration("Invalid TRAWLER_CAPTURE_ON_START"))?;
        }

        if let Ok(timeout) = env::var("TRAWLER_NAVIGATION_TIMEOUT") {
            config.navigation_timeout = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid TRAWLER_NAVIGATION_TIMEOUT"))?;
        }

        if let Ok(log_level) = env::var("TRAWLER_LOG_LEVEL") {
            config.log_level = log_level;
        }

        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }
}

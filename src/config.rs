//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local use.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Remote endpoints ---
    /// REST API base URL (no trailing slash)
    pub api_url: String,
    /// WebSocket endpoint for STOMP notifications
    pub ws_url: String,
    /// Whether `ws_url` is a SockJS endpoint, in which case the raw WebSocket
    /// transport lives at `<ws_url>/websocket`
    pub ws_sockjs: bool,

    // --- Timing ---
    /// Overall timeout for a single REST request
    pub request_timeout: Duration,
    /// Delay before reconnecting a dropped notification connection
    pub reconnect_delay: Duration,
    /// Requested STOMP heart-beat interval (both directions)
    pub heartbeat: Duration,

    // --- Local secure store ---
    /// Path of the encrypted session file
    pub store_path: PathBuf,
    /// Secret the store encryption key is derived from
    pub store_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".to_string(),
            ws_url: "ws://localhost:8080/ws".to_string(),
            ws_sockjs: true,
            request_timeout: Duration::from_secs(30),
            reconnect_delay: Duration::from_millis(5000),
            heartbeat: Duration::from_millis(4000),
            store_path: PathBuf::from("session.json"),
            store_key: "test_store_key".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            api_url: env::var("API_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "http://localhost:8080/api".to_string()),
            ws_url: env::var("WS_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "ws://localhost:8080/ws".to_string()),
            ws_sockjs: env::var("WS_SOCKJS")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
                .unwrap_or(true),
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 30)?),
            reconnect_delay: Duration::from_millis(parse_or("WS_RECONNECT_DELAY_MS", 5000)?),
            heartbeat: Duration::from_millis(parse_or("WS_HEARTBEAT_MS", 4000)?),
            store_path: env::var("CAMPUS_HUB_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_store_path()),
            store_key: env::var("CAMPUS_HUB_STORE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CAMPUS_HUB_STORE_KEY"))?,
        })
    }

    /// URL the notification subscriber actually dials.
    pub fn push_url(&self) -> String {
        if self.ws_sockjs {
            format!("{}/websocket", self.ws_url)
        } else {
            self.ws_url.clone()
        }
    }
}

fn parse_or(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name, v)),
        Err(_) => Ok(default),
    }
}

fn default_store_path() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".campus-hub")
        .join("session.json")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

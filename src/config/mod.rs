//! Configuration module for the forum client.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

use crate::errors::{ClientError, ClientResult};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the forum backend
    pub api_base_url: String,
    /// Per-request timeout applied by both HTTP clients
    pub request_timeout: Duration,
    /// Staleness window for queries that do not declare their own
    pub default_stale_time: Duration,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            default_stale_time: Duration::ZERO,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Configuration pointing at `api_base_url` with every other value defaulted.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let api_base_url = env::var("FORUM_API_BASE_URL").unwrap_or(defaults.api_base_url);

        let request_timeout = match env::var("FORUM_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => parse_timeout("FORUM_REQUEST_TIMEOUT_SECS", &raw)?,
            Err(_) => defaults.request_timeout,
        };

        let default_stale_time = match env::var("FORUM_DEFAULT_STALE_SECS") {
            Ok(raw) => Duration::from_secs(parse_secs("FORUM_DEFAULT_STALE_SECS", &raw)?),
            Err(_) => defaults.default_stale_time,
        };

        let log_level = env::var("FORUM_LOG_LEVEL").unwrap_or(defaults.log_level);

        let log_json = match env::var("FORUM_LOG_JSON") {
            Ok(raw) => parse_flag("FORUM_LOG_JSON", &raw)?,
            Err(_) => defaults.log_json,
        };

        Ok(Self {
            api_base_url,
            request_timeout,
            default_stale_time,
            log_level,
            log_json,
        })
    }
}

fn parse_secs(name: &str, raw: &str) -> ClientResult<u64> {
    raw.trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("Invalid {} value: {}", name, raw)))
}

/// A zero timeout would fail every request, so it is rejected.
fn parse_timeout(name: &str, raw: &str) -> ClientResult<Duration> {
    match parse_secs(name, raw)? {
        0 => Err(ClientError::Config(format!(
            "{} must be greater than zero",
            name
        ))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_flag(name: &str, raw: &str) -> ClientResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ClientError::Config(format!(
            "Invalid {} value: {}",
            name, raw
        ))),
    }
}

//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.
//! The result is resolved once at startup and passed around immutably.

use std::env;
use std::path::PathBuf;

/// Backend used when `NODE_ENV=development`.
pub const DEVELOPMENT_BACKEND_URL: &str = "http://localhost:8888";

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Allowed source domain patterns (`*`, `*.example.com`, `example.com`)
    pub allowed_domains: Vec<String>,
    /// Base URL of the transformation backend
    pub backend_url: String,
    /// Cache TTL in seconds, 0 disables caching
    pub cache_ttl: u64,
    /// Directory holding cached artifacts
    pub cache_dir: PathBuf,
    /// Timeout in seconds for a single backend request
    pub backend_timeout: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ALLOWED_REMOTE_DOMAINS` - Comma-separated domain patterns (default: `*`)
    /// - `IMGPROXY_URL` - Backend base URL (default: `http://imgproxy:8080`)
    /// - `NODE_ENV` - `development` switches the backend to `http://localhost:8888`
    /// - `CACHE_INVALIDATION_TIME` - Cache TTL in seconds (default: 86400)
    /// - `CACHE_DIR` - Cache directory (default: `./cache`)
    /// - `BACKEND_TIMEOUT_SECS` - Backend request timeout (default: 30)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_domains = env::var("ALLOWED_REMOTE_DOMAINS")
            .ok()
            .map(|v| parse_domain_list(&v))
            .unwrap_or(defaults.allowed_domains);

        let development = env::var("NODE_ENV")
            .map(|v| v.eq_ignore_ascii_case("development"))
            .unwrap_or(false);
        let backend_url = if development {
            DEVELOPMENT_BACKEND_URL.to_string()
        } else {
            env::var("IMGPROXY_URL").unwrap_or(defaults.backend_url)
        };

        Self {
            allowed_domains,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            cache_ttl: env::var("CACHE_INVALIDATION_TIME")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_ttl),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            backend_timeout: env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.backend_timeout),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_domains: vec!["*".to_string()],
            backend_url: "http://imgproxy:8080".to_string(),
            cache_ttl: 24 * 60 * 60,
            cache_dir: PathBuf::from("./cache"),
            backend_timeout: 30,
            server_port: 3000,
        }
    }
}

/// Splits a comma-separated pattern list, dropping blanks.
fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect()
}

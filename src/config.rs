//! Daemon configuration
//!
//! Read from environment variables, with defaults matching the marketplace
//! client's historical settings.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Marketplace API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.opensea.io/api/v1";

/// Default IPC socket path
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/asset-cache.sock";

/// Polling the same owner faster than this logs a diagnostic
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FETCH_WAIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Runtime configuration for the asset service and daemon
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding cached asset files
    pub cache_dir: PathBuf,
    /// Marketplace API base URL (without trailing slash)
    pub api_base_url: String,
    /// TCP connect timeout for all HTTP requests
    pub connect_timeout: Duration,
    /// Overall timeout for a marketplace query
    pub request_timeout: Duration,
    /// Longest a download may go without receiving data
    pub read_timeout: Duration,
    /// Longest a fetch waits for a concurrent download of the same file
    pub fetch_wait_timeout: Duration,
    /// Advisory minimum interval between queries for one owner
    pub poll_interval: Duration,
    /// Cached files older than this are pruned at startup (never, if unset)
    pub max_cache_age: Option<Duration>,
    /// Unix socket path for the IPC server
    pub socket_path: PathBuf,
}

impl Config {
    /// Default configuration rooted at a given cache directory
    pub fn with_cache_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            fetch_wait_timeout: DEFAULT_FETCH_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_cache_age: None,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }

    /// Build configuration from the environment
    ///
    /// Recognised variables:
    /// * `ASSET_CACHE_DIR` - cache directory (default: platform cache dir)
    /// * `MARKETPLACE_API_URL` - API base URL
    /// * `MARKETPLACE_CONNECT_TIMEOUT_SECS` / `MARKETPLACE_REQUEST_TIMEOUT_SECS`
    /// * `ASSET_DOWNLOAD_READ_TIMEOUT_SECS` / `ASSET_FETCH_WAIT_SECS` - download stall and lock wait limits
    /// * `ASSET_CACHE_MAX_AGE_SECS` - prune cached files older than this
    /// * `ASSET_DAEMON_SOCKET` - IPC socket path
    pub fn from_env() -> Result<Self> {
        let cache_dir = match env::var("ASSET_CACHE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join("asset-cache"),
        };

        let mut config = Self::with_cache_dir(cache_dir);

        if let Ok(url) = env::var("MARKETPLACE_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = secs_var("MARKETPLACE_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = secs_var("MARKETPLACE_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = secs_var("ASSET_DOWNLOAD_READ_TIMEOUT_SECS")? {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = secs_var("ASSET_FETCH_WAIT_SECS")? {
            config.fetch_wait_timeout = Duration::from_secs(secs);
        }
        config.max_cache_age = secs_var("ASSET_CACHE_MAX_AGE_SECS")?.map(Duration::from_secs);
        if let Ok(path) = env::var("ASSET_DAEMON_SOCKET") {
            config.socket_path = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Owner-assets endpoint (query parameters are appended per request)
    pub fn assets_url(&self) -> String {
        format!("{}/assets/", self.api_base_url)
    }
}

fn secs_var(name: &str) -> Result<Option<u64>> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .with_context(|| format!("{} must be a number of seconds, got {:?}", name, value)),
        Err(_) => Ok(None),
    }
}

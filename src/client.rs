use crate::error::{OblioError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

/// Production API root
pub const BASE_URL: &str = "https://www.oblio.eu/api";

/// Create the HTTP client used for API requests
/// with connection pooling and timeouts taken from `config`
pub fn create_http_client(config: &Config) -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| OblioError::RequestBuild(format!("failed to create HTTP client: {}", e)))
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct Config {
    /// API root; endpoint paths are appended to it
    pub base_url: String,
    /// Upper bound for a whole request, unless the call's deadline is sooner
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(300), // 5 minutes
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 50,
        }
    }
}

impl Config {
    /// Create a new configuration pointing at the given API root
    pub fn new(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
            ..Config::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }
}

//! Client configuration
//!
//! `ClientOptions` is the runtime configuration handed to the transport and
//! the dispatcher. `ClientSettings` is its on-disk form (YAML or JSON) used by
//! the CLI.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default base URL of the Fivetran REST API
pub const DEFAULT_BASE_URL: &str = "https://api.fivetran.com/v1/";

// ============================================================================
// Runtime Options
// ============================================================================

/// Options controlling transport timeouts, concurrency and caching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Overall per-request transport timeout
    pub timeout: Duration,
    /// Maximum transport calls in flight (0 = unbounded)
    pub max_concurrent_requests: u16,
    /// User agent sent on every request
    pub user_agent: String,
    /// How long a successful response body is reused (zero disables caching)
    pub cache_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(40),
            max_concurrent_requests: 0,
            user_agent: default_user_agent(),
            cache_ttl: Duration::from_secs(30),
        }
    }
}

impl ClientOptions {
    /// Create a new options builder
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// Reject values the transport cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::invalid_value(
                "timeout",
                "Timeout must be a positive value",
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::invalid_value("user_agent", "User agent is empty"));
        }
        Ok(())
    }
}

/// Builder for client options
#[derive(Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = timeout;
        self
    }

    /// Bound the number of concurrent transport calls
    pub fn max_concurrent_requests(mut self, max: u16) -> Self {
        self.options.max_concurrent_requests = max;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.options.user_agent = agent.into();
        self
    }

    /// Set the cache TTL for successful responses
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.options.cache_ttl = ttl;
        self
    }

    /// Disable response caching
    pub fn no_cache(mut self) -> Self {
        self.options.cache_ttl = Duration::ZERO;
        self
    }

    /// Build the options
    pub fn build(self) -> ClientOptions {
        self.options
    }
}

fn default_user_agent() -> String {
    format!("fivetran-client/{}", env!("CARGO_PKG_VERSION"))
}

// ============================================================================
// File Settings
// ============================================================================

/// Client settings as stored in a YAML or JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent requests (0 = unbounded)
    #[serde(default)]
    pub max_concurrent_requests: u16,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Response cache TTL in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    40
}

fn default_cache_ttl_secs() -> u64 {
    30
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_concurrent_requests: 0,
            user_agent: default_user_agent(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl ClientSettings {
    /// Load settings from a file; `.json` files are parsed as JSON, anything
    /// else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Convert into validated runtime options
    pub fn into_options(self) -> Result<ClientOptions> {
        let options = ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            max_concurrent_requests: self.max_concurrent_requests,
            user_agent: self.user_agent,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
        };
        options.validate()?;
        Ok(options)
    }
}

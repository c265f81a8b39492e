//! Resilient GET dispatcher
//!
//! Every GET issued by the fetchers goes through `RequestDispatcher::get`,
//! which handles:
//! - response caching keyed by the full request URL
//! - a bound on concurrent transport calls
//! - a client-wide backoff deadline after any 429
//! - bounded retries on 429, honoring `Retry-After`

use super::rate_limit::{ConcurrencyGate, RetryGate, DEFAULT_RETRY_AFTER};
use super::transport::{HttpResponse, Transport};
use crate::cache::TtlCache;
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Number of retries after a 429 before giving up
pub const MAX_429_RETRIES: u32 = 3;

/// Successful response handed to the fetchers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Response status (200 for cache hits)
    pub status: StatusCode,
    /// Response body
    pub body: Arc<str>,
    /// Whether the body was served from the cache
    pub from_cache: bool,
}

impl ApiResponse {
    /// Response body as text
    pub fn text(&self) -> &str {
        &self.body
    }
}

/// Rate-limit, retry and cache aware GET dispatcher
///
/// All state (gate, deadline, cache) is owned by the instance, so separate
/// dispatchers never throttle or serve each other.
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    gate: ConcurrencyGate,
    retry_gate: RetryGate,
    cache: TtlCache<String, Arc<str>>,
    cache_ttl: Duration,
}

impl RequestDispatcher {
    /// Create a dispatcher over `transport` with the given options
    pub fn new(transport: Arc<dyn Transport>, options: &ClientOptions) -> Self {
        Self {
            transport,
            gate: ConcurrencyGate::new(options.max_concurrent_requests),
            retry_gate: RetryGate::new(),
            cache: TtlCache::new(),
            cache_ttl: options.cache_ttl,
        }
    }

    /// Create a dispatcher with default options
    pub fn with_defaults(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, &ClientOptions::default())
    }

    /// Free concurrency permits, `None` when concurrency is unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.gate.available_permits()
    }

    /// Time left before the next request may be issued after a 429
    pub fn retry_after_remaining(&self) -> Option<Duration> {
        self.retry_gate.remaining()
    }

    /// Drop expired cache entries, returning how many were removed
    pub fn purge_cache(&self) -> usize {
        self.cache.purge_expired()
    }

    /// GET `url`, retrying on 429 and serving fresh cached bodies
    pub async fn get(&self, url: &str, cancel: &CancellationToken) -> Result<ApiResponse> {
        let mut attempt = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            if let Some(body) = self.cache.get(url) {
                debug!(url, "Serving response from cache");
                return Ok(ApiResponse {
                    status: StatusCode::OK,
                    body,
                    from_cache: true,
                });
            }

            let response = self.send_once(url, cancel).await?;
            let status = response.status;

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt >= MAX_429_RETRIES {
                    return Err(Error::RateLimitExceeded {
                        url: url.to_string(),
                        max_retries: MAX_429_RETRIES,
                    });
                }

                let wait = response.retry_after().unwrap_or(DEFAULT_RETRY_AFTER);
                drop(response);
                warn!(
                    "Rate limited (429) for {url}, attempt {}/{}, waiting {wait:?}",
                    attempt + 1,
                    MAX_429_RETRIES + 1,
                );

                tokio::select! {
                    () = cancel.cancelled() => return Err(Error::Cancelled),
                    () = tokio::time::sleep(wait) => {}
                }
                attempt += 1;
                continue;
            }

            if !status.is_success() {
                return Err(Error::http_status(status.as_u16(), url, &response.text()));
            }

            let body: Arc<str> = Arc::from(response.text());
            if !self.cache_ttl.is_zero() {
                self.cache
                    .insert(url.to_string(), Arc::clone(&body), self.cache_ttl);
            }

            debug!(url, status = status.as_u16(), "Request succeeded");
            return Ok(ApiResponse {
                status,
                body,
                from_cache: false,
            });
        }
    }

    /// One gated transport call
    ///
    /// The permit lives until this returns, on every exit path. A 429 pushes
    /// the shared deadline forward before the permit is released.
    async fn send_once(&self, url: &str, cancel: &CancellationToken) -> Result<HttpResponse> {
        let _permit = self.gate.acquire(cancel).await?;

        self.retry_gate.wait(cancel).await?;
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!(url, "Sending request");
        let response = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            response = self.transport.get(url) => response?,
        };

        if response.status == StatusCode::TOO_MANY_REQUESTS {
            let wait = response.retry_after().unwrap_or(DEFAULT_RETRY_AFTER);
            self.retry_gate.defer(wait);
        }

        Ok(response)
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("gate", &self.gate)
            .field("cache_ttl", &self.cache_ttl)
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

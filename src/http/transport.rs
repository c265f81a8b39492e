//! Transport abstraction
//!
//! The dispatcher talks to the network only through `Transport`, so the
//! retry, cache and gate logic can be driven by an in-process stub in tests.

use super::rate_limit::MAX_RETRY_AFTER;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

/// Fully read HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response with a status and body and no headers
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Delay requested by the server through `Retry-After`, in seconds
    ///
    /// Fractional seconds are accepted and the result is capped at
    /// `MAX_RETRY_AFTER`. Negative, non-finite and HTTP-date values yield
    /// `None`.
    pub fn retry_after(&self) -> Option<Duration> {
        let raw = self.headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
        let wait = match raw.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => Duration::try_from_secs_f64(raw.parse::<f64>().ok()?).ok()?,
        };
        Some(wait.min(MAX_RETRY_AFTER))
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Something that can perform a GET against the API
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET for a URL relative to the API base and read the body
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

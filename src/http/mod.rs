//! HTTP module
//!
//! Provides the resilient GET path shared by every fetcher.
//!
//! # Features
//!
//! - **Transport**: pluggable `Transport` trait, reqwest implementation
//! - **Rate Limiting**: client-wide backoff deadline after HTTP 429
//! - **Retries**: up to three retries on 429, honoring `Retry-After`
//! - **Concurrency Gate**: optional bound on transport calls in flight
//! - **Caching**: successful bodies reused for a configurable TTL

mod client;
mod dispatcher;
mod rate_limit;
mod transport;

pub use client::{HttpClientConfig, HttpClientConfigBuilder, ReqwestTransport};
pub use dispatcher::{ApiResponse, RequestDispatcher, MAX_429_RETRIES};
pub use rate_limit::{
    ConcurrencyGate, GatePermit, RetryGate, DEFAULT_RETRY_AFTER, MAX_RETRY_AFTER,
};
pub use transport::{HttpResponse, Transport};

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests;

//! In-process transport stub shared by unit tests

use super::transport::{HttpResponse, Transport};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

type Handler = dyn Fn(&str, usize) -> HttpResponse + Send + Sync;

/// Transport answering from a closure and recording what it saw
pub(crate) struct StubTransport {
    handler: Box<Handler>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl StubTransport {
    /// Stub answering each call with `handler(url, call_index)`
    pub(crate) fn new(handler: impl Fn(&str, usize) -> HttpResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        }
    }

    /// Make every call take `delay` before answering
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        let _in_flight = InFlight::enter(&self.in_flight, &self.max_in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok((self.handler)(url, index))
    }
}

/// Counts one call in flight until dropped, including when the call is
/// cancelled mid-delay
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 200 response with a JSON body
pub(crate) fn ok(body: &str) -> HttpResponse {
    HttpResponse::new(StatusCode::OK, body.to_string())
}

/// 429 response, optionally carrying `Retry-After`
pub(crate) fn too_many_requests(retry_after: Option<&'static str>) -> HttpResponse {
    let mut response = HttpResponse::new(StatusCode::TOO_MANY_REQUESTS, "slow down");
    if let Some(value) = retry_after {
        response
            .headers
            .insert(RETRY_AFTER, HeaderValue::from_static(value));
    }
    response
}

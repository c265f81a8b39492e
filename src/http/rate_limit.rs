//! Rate limiting primitives
//!
//! - `RetryGate`: the shared "do not call before" deadline pushed forward
//!   whenever the server answers 429
//! - `ConcurrencyGate`: an optional counting permit pool bounding the number
//!   of transport calls in flight

use crate::error::{Error, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Backoff used when a 429 carries no usable `Retry-After`
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Longest backoff honored from a server hint
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Shared earliest-next-request deadline
///
/// The lock only guards the timestamp itself and is never held while
/// waiting.
#[derive(Debug)]
pub struct RetryGate {
    not_before: Mutex<Instant>,
}

impl Default for RetryGate {
    fn default() -> Self {
        Self {
            not_before: Mutex::new(Instant::now()),
        }
    }
}

impl RetryGate {
    /// Create a gate that is open
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid new requests for `wait` from now, saturating at
    /// `MAX_RETRY_AFTER` when the deadline would overflow the clock
    pub fn defer(&self, wait: Duration) {
        let now = Instant::now();
        let deadline = now
            .checked_add(wait)
            .unwrap_or_else(|| now + MAX_RETRY_AFTER);

        let mut not_before = self
            .not_before
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *not_before = deadline;
    }

    /// Time left until requests are allowed again
    pub fn remaining(&self) -> Option<Duration> {
        let not_before = *self
            .not_before
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        (not_before > now).then(|| not_before - now)
    }

    /// Suspend until the deadline read on entry has passed
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<()> {
        let Some(remaining) = self.remaining() else {
            return Ok(());
        };

        tokio::select! {
            () = cancel.cancelled() => Err(Error::Cancelled),
            () = tokio::time::sleep(remaining) => Ok(()),
        }
    }
}

/// Optional bound on concurrent transport calls
///
/// An unbounded gate hands out empty permits and never blocks.
#[derive(Debug, Clone, Default)]
pub struct ConcurrencyGate {
    semaphore: Option<Arc<Semaphore>>,
}

/// Permit held for the duration of one transport call; released on drop
#[derive(Debug)]
pub struct GatePermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl ConcurrencyGate {
    /// Gate admitting at most `max` concurrent calls (0 = unbounded)
    pub fn new(max: u16) -> Self {
        Self {
            semaphore: (max > 0).then(|| Arc::new(Semaphore::new(usize::from(max)))),
        }
    }

    /// Check if this gate limits concurrency
    pub fn is_bounded(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Permits currently free, `None` when unbounded
    pub fn available_permits(&self) -> Option<usize> {
        self.semaphore.as_ref().map(|s| s.available_permits())
    }

    /// Wait for a permit
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<GatePermit> {
        let Some(semaphore) = &self.semaphore else {
            return Ok(GatePermit { _permit: None });
        };

        let permit = tokio::select! {
            () = cancel.cancelled() => return Err(Error::Cancelled),
            permit = Arc::clone(semaphore).acquire_owned() => permit,
        };

        permit
            .map(|p| GatePermit { _permit: Some(p) })
            .map_err(|_| Error::Other("Concurrency gate closed".to_string()))
    }
}

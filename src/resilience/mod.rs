//! Adaptive resilience layer.
//!
//! Wraps the codec with per-request processing-path selection (in-memory
//! versus streaming), bounded streaming concurrency, a streaming deadline
//! composed with caller cancellation, and a single automatic fallback from
//! a failed streaming attempt to the in-memory path.

pub mod metrics;
pub mod orchestrator;
pub mod semaphore;
pub mod source;
mod stream;

pub use metrics::{metrics, MetricsSnapshot};
pub use orchestrator::Orchestrator;
pub use source::{FileSource, MemorySource, PayloadSource, ReaderSource};

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Caller-owned cancellation signal, shared across threads.
///
/// Cancellation is cooperative: long operations check the token between
/// chunks and while waiting for a concurrency slot.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    canceled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    /// Fail with [`Error::Canceled`] once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_canceled() {
            Err(Error::Canceled)
        } else {
            Ok(())
        }
    }
}

/// Deadline for one streaming operation.
///
/// Composes with, but does not replace, the caller's cancellation token:
/// whichever fires first ends the operation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    end: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn start(limit: Duration) -> Self {
        Self {
            end: Instant::now() + limit,
            limit,
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.end
    }

    /// Fail with [`Error::TimedOut`] once the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.expired() {
            Err(Error::TimedOut { limit: self.limit })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());

        let shared = token.clone();
        shared.cancel();
        assert!(matches!(token.check(), Err(Error::Canceled)));
    }

    #[test]
    fn test_deadline() {
        let deadline = Deadline::start(Duration::from_secs(60));
        assert!(deadline.check().is_ok());

        let expired = Deadline::start(Duration::ZERO);
        assert!(matches!(expired.check(), Err(Error::TimedOut { .. })));
    }
}

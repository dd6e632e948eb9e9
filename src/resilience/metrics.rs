//! Process-wide resilience counters.
//!
//! Observability only: nothing in the orchestrator branches on these.
//! Initialized at process start, incremented lock-free from any thread,
//! reset only by process restart.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for streaming-path activity.
#[derive(Debug)]
pub struct ResilienceMetrics {
    streaming_attempts: AtomicU64,
    streaming_errors: AtomicU64,
    fallbacks: AtomicU64,
}

impl ResilienceMetrics {
    const fn new() -> Self {
        Self {
            streaming_attempts: AtomicU64::new(0),
            streaming_errors: AtomicU64::new(0),
            fallbacks: AtomicU64::new(0),
        }
    }

    pub fn record_streaming_attempt(&self) {
        self.streaming_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_streaming_error(&self) {
        self.streaming_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent-enough point-in-time view of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            streaming_attempts: self.streaming_attempts.load(Ordering::Relaxed),
            streaming_errors: self.streaming_errors.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Plain-data view of the counters, serializable for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub streaming_attempts: u64,
    pub streaming_errors: u64,
    pub fallbacks: u64,
}

static METRICS: ResilienceMetrics = ResilienceMetrics::new();

/// The process-wide metrics instance.
pub fn metrics() -> &'static ResilienceMetrics {
    &METRICS
}

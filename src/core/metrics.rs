//! Logger metrics for observability
//!
//! Sink failures never reach the caller, so these counters are the only
//! place they show up.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one logger instance
///
/// # Example
///
/// ```
/// use multilog::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_delivered();
/// metrics.record_handler_failure();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.handler_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records built by `dispatch`
    dispatched: AtomicU64,

    /// Handler calls that returned `Ok`
    delivered: AtomicU64,

    /// Handler calls that returned an error (swallowed)
    handler_failures: AtomicU64,

    /// Output bindings skipped because the record was below their threshold
    filtered: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    /// Record a dispatched record; returns the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_handler_failure(&self) -> u64 {
        self.handler_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of handler calls that failed, as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if no handler has been called.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.handler_failures() as f64;
        let total = self.delivered() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            delivered: AtomicU64::new(self.delivered()),
            handler_failures: AtomicU64::new(self.handler_failures()),
            filtered: AtomicU64::new(self.filtered()),
        }
    }
}

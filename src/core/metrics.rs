//! Logger metrics for observability
//!
//! Counters are kept on the root of a tree and shared by every logger in it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tree-wide dispatch and lifecycle counters
///
/// # Example
///
/// ```
/// use rust_logger_tree::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_handler_failure();
///
/// assert_eq!(metrics.records_dispatched(), 1);
/// assert_eq!(metrics.handler_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records delivered to the handler list
    records_dispatched: AtomicU64,

    /// Handler calls made for records
    deliveries: AtomicU64,

    /// Handler calls for records that returned an error or panicked
    delivery_failures: AtomicU64,

    /// Handler calls of any kind that returned an error or panicked
    handler_failures: AtomicU64,

    /// Child loggers created
    loggers_created: AtomicU64,

    /// Loggers transitioned to closed
    loggers_closed: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            records_dispatched: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            delivery_failures: AtomicU64::new(0),
            handler_failures: AtomicU64::new(0),
            loggers_created: AtomicU64::new(0),
            loggers_closed: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn records_dispatched(&self) -> u64 {
        self.records_dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn loggers_created(&self) -> u64 {
        self.loggers_created.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn loggers_closed(&self) -> u64 {
        self.loggers_closed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.records_dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery(&self) -> u64 {
        self.deliveries.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivery_failure(&self) -> u64 {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_handler_failure(&self) -> u64 {
        self.handler_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_created(&self) -> u64 {
        self.loggers_created.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_closed(&self) -> u64 {
        self.loggers_closed.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of handler calls for records that failed, as a percentage
    ///
    /// Close and flush failures are not included. Returns 0.0 if no record
    /// has reached a handler.
    pub fn failure_rate(&self) -> f64 {
        let deliveries = self.deliveries() as f64;
        if deliveries == 0.0 {
            0.0
        } else {
            (self.delivery_failures() as f64 / deliveries) * 100.0
        }
    }

    pub fn reset(&self) {
        self.records_dispatched.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.delivery_failures.store(0, Ordering::Relaxed);
        self.handler_failures.store(0, Ordering::Relaxed);
        self.loggers_created.store(0, Ordering::Relaxed);
        self.loggers_closed.store(0, Ordering::Relaxed);
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
            records_dispatched: AtomicU64::new(self.records_dispatched()),
            deliveries: AtomicU64::new(self.deliveries()),
            delivery_failures: AtomicU64::new(self.delivery_failures()),
            handler_failures: AtomicU64::new(self.handler_failures()),
            loggers_created: AtomicU64::new(self.loggers_created()),
            loggers_closed: AtomicU64::new(self.loggers_closed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.records_dispatched(), 0);
        assert_eq!(metrics.deliveries(), 0);
        assert_eq!(metrics.delivery_failures(), 0);
        assert_eq!(metrics.handler_failures(), 0);
        assert_eq!(metrics.loggers_created(), 0);
        assert_eq!(metrics.loggers_closed(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_created(), 0);
        assert_eq!(metrics.record_created(), 1);
        assert_eq!(metrics.loggers_created(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..10 {
            metrics.record_delivery();
        }
        metrics.record_delivery_failure();

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_failure_rate_ignores_lifecycle_failures() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_delivery();
        metrics.record_delivery();
        for _ in 0..5 {
            metrics.record_handler_failure();
        }

        assert_eq!(metrics.failure_rate(), 0.0);
        assert_eq!(metrics.handler_failures(), 5);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let metrics = LoggerMetrics::new();
        metrics.record_closed();

        let snapshot = metrics.clone();
        metrics.record_closed();

        assert_eq!(snapshot.loggers_closed(), 1);
        assert_eq!(metrics.loggers_closed(), 2);

        metrics.reset();
        assert_eq!(metrics.loggers_closed(), 0);
    }
}

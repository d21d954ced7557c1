//! Serving counters
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters owned by the serving loop and reported at shutdown
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    predictions_served: AtomicU64,
    predictions_rejected: AtomicU64,
    exceeded_alerts: AtomicU64,
    predictions_clamped: AtomicU64,
    log_write_failures: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_predictions_served(&self) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_predictions_rejected(&self) {
        self.predictions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_exceeded_alerts(&self) {
        self.exceeded_alerts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_predictions_clamped(&self) {
        self.predictions_clamped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_log_write_failures(&self) {
        self.log_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            predictions_rejected: self.predictions_rejected.load(Ordering::Relaxed),
            exceeded_alerts: self.exceeded_alerts.load(Ordering::Relaxed),
            predictions_clamped: self.predictions_clamped.load(Ordering::Relaxed),
            log_write_failures: self.log_write_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub predictions_rejected: u64,
    pub exceeded_alerts: u64,
    pub predictions_clamped: u64,
    pub log_write_failures: u64,
}

impl MetricsSnapshot {
    /// Counters as log fields, in declaration order
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("predictions_served", self.predictions_served.to_string()),
            ("predictions_rejected", self.predictions_rejected.to_string()),
            ("exceeded_alerts", self.exceeded_alerts.to_string()),
            ("predictions_clamped", self.predictions_clamped.to_string()),
            ("log_write_failures", self.log_write_failures.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();

        registry.increment_predictions_served();
        registry.increment_predictions_served();
        registry.increment_predictions_rejected();
        registry.increment_exceeded_alerts();
        registry.increment_predictions_clamped();
        registry.increment_log_write_failures();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.predictions_served, 2);
        assert_eq!(snapshot.predictions_rejected, 1);
        assert_eq!(snapshot.exceeded_alerts, 1);
        assert_eq!(snapshot.predictions_clamped, 1);
        assert_eq!(snapshot.log_write_failures, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.increment_predictions_served();

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["predictions_served"], 1);
        assert_eq!(json["log_write_failures"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    reg.increment_predictions_served();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().predictions_served, 1000);
    }
}

//! Observability subsystem
//!
//! - Structured logging (JSON lines on stderr)
//! - Serving counters
//! - Begin/complete tracing of training runs
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails an operation
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use toolwear::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::ModelLoaded, &[("path", "models/rf_model.json")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_predictions_served();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a typed event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded, &[("path", "toolwear.json")]);
        log_event(Event::LogWriteFailed, &[("reason", "disk full")]);
    }
}

//! Observable events
//!
//! Every line the logger writes names one of these events. Events are
//! explicit and typed; ad hoc event strings only come from
//! `ObservationScope`.

use std::fmt;

use super::logger::Severity;

/// Observable events in toolwear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded (or defaulted)
    ConfigLoaded,

    // Training
    /// Training pipeline started
    TrainingStart,
    /// Dataset parsed and encoded
    DatasetLoaded,
    /// Forest fitted
    ModelFitted,
    /// Held-out metrics computed
    ModelEvaluated,
    /// Artifact atomically written
    ArtifactWritten,

    // Inference
    /// Artifact loaded at startup
    ModelLoaded,
    /// Prediction returned to the caller
    PredictionServed,
    /// Request rejected before a prediction was produced
    PredictionRejected,
    /// Negative prediction clamped to zero
    PredictionClamped,

    // Result log
    /// Row appended to an existing log
    LogAppended,
    /// Log created with header and first row
    LogCreated,
    /// Unparseable log deleted
    LogCorruptionReset,
    /// Append failed; prediction still served
    LogWriteFailed,

    // Serving loop
    /// Serving loop ready
    Serving,
    /// Serving loop ended
    ShutdownComplete,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::TrainingStart => "TRAINING_START",
            Event::DatasetLoaded => "DATASET_LOADED",
            Event::ModelFitted => "MODEL_FITTED",
            Event::ModelEvaluated => "MODEL_EVALUATED",
            Event::ArtifactWritten => "ARTIFACT_WRITTEN",

            Event::ModelLoaded => "MODEL_LOADED",
            Event::PredictionServed => "PREDICTION_SERVED",
            Event::PredictionRejected => "PREDICTION_REJECTED",
            Event::PredictionClamped => "PREDICTION_CLAMPED",

            Event::LogAppended => "RESULT_LOG_APPEND",
            Event::LogCreated => "RESULT_LOG_CREATED",
            Event::LogCorruptionReset => "RESULT_LOG_CORRUPTION_RESET",
            Event::LogWriteFailed => "RESULT_LOG_WRITE_FAILED",

            Event::Serving => "TOOLWEAR_SERVING",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PredictionRejected
            | Event::PredictionClamped
            | Event::LogCorruptionReset
            | Event::LogWriteFailed => Severity::Warn,
            Event::LogAppended => Severity::Trace,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event signals degraded behavior
    pub fn is_warning(&self) -> bool {
        self.severity() >= Severity::Warn
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Model error types
//!
//! Error codes:
//! - TOOLWEAR_MODEL_LOAD_FAILED (FATAL)
//! - TOOLWEAR_MODEL_WRITE_FAILED (FATAL)
//! - TOOLWEAR_FIT_FAILED (FATAL)
//! - TOOLWEAR_PREDICTION_FAILED (REJECT)

use std::path::Path;

use thiserror::Error;

use crate::errors::{ErrorCode, Severity};

/// Errors raised while fitting, persisting, loading or evaluating a model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    // ==================
    // Fitting
    // ==================
    /// No rows to fit on
    #[error("cannot fit a forest on an empty training set")]
    EmptyTrainingSet,

    /// Rows and targets disagree in shape
    #[error("training row {row} has {actual} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Targets and rows have different lengths
    #[error("{rows} training rows but {targets} targets")]
    TargetCountMismatch { rows: usize, targets: usize },

    /// Forest parameters out of range
    #[error("invalid forest parameter: {0}")]
    InvalidParameter(String),

    // ==================
    // Prediction
    // ==================
    /// Feature vector length does not match the forest
    #[error("model expects {expected} features, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    /// Feature names or order differ from the bound schema
    #[error("feature record does not follow the model's feature order")]
    FeatureOrderMismatch,

    /// Model produced NaN or infinity
    #[error("model produced a non-finite prediction ({0})")]
    NonFinitePrediction(f64),

    // ==================
    // Artifact
    // ==================
    /// Artifact file does not exist
    #[error("model artifact not found at '{path}'")]
    ArtifactMissing { path: String },

    /// Artifact could not be read or parsed
    #[error("model artifact '{path}' is unreadable: {reason}")]
    ArtifactUnreadable { path: String, reason: String },

    /// Payload checksum does not match the envelope
    #[error("model artifact '{path}' failed checksum: expected {expected:#010x}, computed {computed:#010x}")]
    ChecksumMismatch {
        path: String,
        expected: u32,
        computed: u32,
    },

    /// Artifact written by an unknown format version
    #[error("model artifact '{path}' has unsupported format version {found}")]
    UnsupportedVersion { path: String, found: u32 },

    /// Artifact parsed but its contents are inconsistent
    #[error("model artifact is incompatible: {0}")]
    Incompatible(String),

    /// Artifact could not be written
    #[error("failed to write model artifact '{path}': {reason}")]
    ArtifactWrite { path: String, reason: String },
}

impl ModelError {
    pub(crate) fn unreadable(path: &Path, reason: impl ToString) -> Self {
        ModelError::ArtifactUnreadable {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write_failed(path: &Path, reason: impl ToString) -> Self {
        ModelError::ArtifactWrite {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors raised while evaluating a single prediction
    pub fn is_prediction_failure(&self) -> bool {
        matches!(
            self,
            ModelError::FeatureCountMismatch { .. }
                | ModelError::FeatureOrderMismatch
                | ModelError::NonFinitePrediction(_)
        )
    }
}

impl ErrorCode for ModelError {
    fn code(&self) -> &'static str {
        match self {
            ModelError::EmptyTrainingSet
            | ModelError::RaggedRow { .. }
            | ModelError::TargetCountMismatch { .. }
            | ModelError::InvalidParameter(_) => "TOOLWEAR_FIT_FAILED",
            ModelError::FeatureCountMismatch { .. }
            | ModelError::FeatureOrderMismatch
            | ModelError::NonFinitePrediction(_) => "TOOLWEAR_PREDICTION_FAILED",
            ModelError::ArtifactMissing { .. }
            | ModelError::ArtifactUnreadable { .. }
            | ModelError::ChecksumMismatch { .. }
            | ModelError::UnsupportedVersion { .. }
            | ModelError::Incompatible(_) => "TOOLWEAR_MODEL_LOAD_FAILED",
            ModelError::ArtifactWrite { .. } => "TOOLWEAR_MODEL_WRITE_FAILED",
        }
    }

    fn severity(&self) -> Severity {
        if self.is_prediction_failure() {
            Severity::Reject
        } else {
            Severity::Fatal
        }
    }
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_failures_reject() {
        let err = ModelError::FeatureCountMismatch {
            expected: 8,
            actual: 7,
        };
        assert_eq!(err.code(), "TOOLWEAR_PREDICTION_FAILED");
        assert_eq!(err.severity(), Severity::Reject);
    }

    #[test]
    fn test_load_failures_fatal() {
        let err = ModelError::ArtifactMissing {
            path: "models/rf_model.json".into(),
        };
        assert_eq!(err.code(), "TOOLWEAR_MODEL_LOAD_FAILED");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("models/rf_model.json"));
    }

    #[test]
    fn test_checksum_display_is_hex() {
        let err = ModelError::ChecksumMismatch {
            path: "m.json".into(),
            expected: 0xdead_beef,
            computed: 1,
        };
        assert!(err.to_string().contains("0xdeadbeef"));
    }
}

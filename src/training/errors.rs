//! Training error types
//!
//! Every training error is FATAL: the pipeline stops and no artifact is
//! written.

use thiserror::Error;

use crate::errors::{ErrorCode, Severity};
use crate::model::ModelError;
use crate::schema::SchemaError;

/// Errors raised by the training pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    /// Dataset file does not exist
    #[error("dataset not found at '{path}'")]
    DatasetMissing { path: String },

    /// Dataset file could not be opened or its header read
    #[error("dataset '{path}' is unreadable: {reason}")]
    DatasetUnreadable { path: String, reason: String },

    /// A data row could not be parsed
    #[error("dataset row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    /// Header does not carry the expected columns
    #[error("dataset columns do not match the feature schema: {0}")]
    SchemaMismatch(SchemaError),

    /// Material label outside the enumeration
    #[error("dataset row {row}: {source}")]
    Encoding { row: usize, source: SchemaError },

    /// Not enough rows to train
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Pipeline configuration out of range
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    /// Fitting or persisting the model failed
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<SchemaError> for TrainingError {
    fn from(e: SchemaError) -> Self {
        TrainingError::SchemaMismatch(e)
    }
}

impl ErrorCode for TrainingError {
    fn code(&self) -> &'static str {
        match self {
            TrainingError::DatasetMissing { .. }
            | TrainingError::DatasetUnreadable { .. }
            | TrainingError::MalformedRow { .. } => "TOOLWEAR_DATASET_UNREADABLE",
            TrainingError::SchemaMismatch(e) => e.code(),
            TrainingError::Encoding { source, .. } => source.code(),
            TrainingError::InsufficientData(_) => "TOOLWEAR_INSUFFICIENT_DATA",
            TrainingError::InvalidConfig(_) => "TOOLWEAR_CONFIG_INVALID",
            TrainingError::Model(e) => e.code(),
        }
    }

    fn severity(&self) -> Severity {
        Severity::Fatal
    }
}

/// Result type for training operations
pub type TrainingResult<T> = Result<T, TrainingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MismatchDetails;

    #[test]
    fn test_codes_pass_through() {
        let err = TrainingError::from(SchemaError::Mismatch(MismatchDetails::missing_field(
            "Tool Wear (µm)",
        )));
        assert_eq!(err.code(), "TOOLWEAR_SCHEMA_MISMATCH");
        assert!(err.is_fatal());

        let err = TrainingError::Encoding {
            row: 4,
            source: SchemaError::UnknownMaterial {
                label: "Brass".into(),
            },
        };
        assert_eq!(err.code(), "TOOLWEAR_ENCODING_FAILED");
        assert!(err.to_string().starts_with("dataset row 4"));
    }
}

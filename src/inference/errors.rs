//! Inference error types
//!
//! `ModelLoad` is FATAL and only raised at startup. Everything else rejects
//! the single request; the engine keeps serving.

use thiserror::Error;

use crate::errors::{ErrorCode, Severity};
use crate::model::ModelError;
use crate::schema::SchemaError;

/// Errors raised at the request boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// Artifact missing, unreadable, tampered with or inconsistent
    #[error("failed to load model: {0}")]
    ModelLoad(ModelError),

    /// Material label outside the enumeration
    #[error(transparent)]
    Encoding(SchemaError),

    /// Request fields do not line up with the model's schema
    #[error(transparent)]
    SchemaMismatch(SchemaError),

    /// Model could not produce a usable value
    #[error("prediction failed: {0}")]
    Prediction(ModelError),

    /// Threshold is negative, NaN or infinite
    #[error("wear threshold must be a finite number >= 0, got {0}")]
    InvalidThreshold(f64),

    /// Request body is not a usable prediction request
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<SchemaError> for InferenceError {
    fn from(e: SchemaError) -> Self {
        if e.is_encoding() {
            InferenceError::Encoding(e)
        } else {
            InferenceError::SchemaMismatch(e)
        }
    }
}

impl ErrorCode for InferenceError {
    fn code(&self) -> &'static str {
        match self {
            InferenceError::ModelLoad(_) => "TOOLWEAR_MODEL_LOAD_FAILED",
            InferenceError::Encoding(e) | InferenceError::SchemaMismatch(e) => e.code(),
            InferenceError::Prediction(_) => "TOOLWEAR_PREDICTION_FAILED",
            InferenceError::InvalidThreshold(_) => "TOOLWEAR_INVALID_THRESHOLD",
            InferenceError::InvalidRequest(_) => "TOOLWEAR_INVALID_REQUEST",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            InferenceError::ModelLoad(_) => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

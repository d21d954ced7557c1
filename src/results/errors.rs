//! Result log error types
//!
//! Every result log error is a WARN: predictions are still served and the
//! failure is reported alongside them.

use thiserror::Error;

use crate::errors::{ErrorCode, Severity};

/// Errors raised by the result log
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultLogError {
    /// Row could not be written
    #[error("failed to write result log '{path}': {reason}")]
    WriteFailed { path: String, reason: String },

    /// Existing header differs from the record being appended
    #[error("result log '{path}' header mismatch: expected [{}], found [{}]", expected.join(", "), found.join(", "))]
    HeaderMismatch {
        path: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Log content could not be parsed; the file was reset
    #[error("result log '{path}' was corrupted and has been reset: {reason}")]
    Corrupted { path: String, reason: String },

    /// Log could not be read for a reason other than its content
    #[error("failed to read result log '{path}': {reason}")]
    ReadFailed { path: String, reason: String },

    /// Export writer failed
    #[error("failed to export result log: {0}")]
    ExportFailed(String),
}

impl ErrorCode for ResultLogError {
    fn code(&self) -> &'static str {
        match self {
            ResultLogError::WriteFailed { .. } => "TOOLWEAR_LOG_WRITE_FAILED",
            ResultLogError::HeaderMismatch { .. } => "TOOLWEAR_LOG_HEADER_MISMATCH",
            ResultLogError::Corrupted { .. } => "TOOLWEAR_LOG_CORRUPTED",
            ResultLogError::ReadFailed { .. } => "TOOLWEAR_LOG_READ_FAILED",
            ResultLogError::ExportFailed(_) => "TOOLWEAR_LOG_EXPORT_FAILED",
        }
    }

    fn severity(&self) -> Severity {
        Severity::Warn
    }
}

/// Result type for result log operations
pub type ResultLogResult<T> = Result<T, ResultLogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_mismatch_display() {
        let err = ResultLogError::HeaderMismatch {
            path: "results.csv".into(),
            expected: vec!["a".into(), "b".into()],
            found: vec!["a".into()],
        };
        assert_eq!(
            err.to_string(),
            "result log 'results.csv' header mismatch: expected [a, b], found [a]"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_codes() {
        let err = ResultLogError::Corrupted {
            path: "results.csv".into(),
            reason: "ragged row".into(),
        };
        assert_eq!(err.code(), "TOOLWEAR_LOG_CORRUPTED");
        assert_eq!(err.severity(), Severity::Warn);
    }
}

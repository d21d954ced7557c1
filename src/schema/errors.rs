//! Schema error types
//!
//! Error codes:
//! - TOOLWEAR_ENCODING_FAILED (REJECT)
//! - TOOLWEAR_SCHEMA_MISMATCH (REJECT)
//! - TOOLWEAR_SCHEMA_INVALID (FATAL, raised while loading an artifact)

use std::fmt;

use thiserror::Error;

use crate::errors::{ErrorCode, Severity};

/// Which fields were missing or unexpected when a feature set was checked
/// against a schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MismatchDetails {
    /// Fields the schema expects but the input lacks
    pub missing: Vec<String>,
    /// Fields the input carries but the schema does not declare
    pub extra: Vec<String>,
}

impl MismatchDetails {
    pub fn new(missing: Vec<String>, extra: Vec<String>) -> Self {
        Self { missing, extra }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self {
            missing: vec![field.into()],
            extra: Vec::new(),
        }
    }

    /// Returns true if nothing is missing and nothing is extra
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

impl fmt::Display for MismatchDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("missing fields [{}]", self.missing.join(", ")));
        }
        if !self.extra.is_empty() {
            parts.push(format!("unexpected fields [{}]", self.extra.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

/// Errors raised while encoding or aligning features
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// Material label outside the closed enumeration
    #[error("unknown material '{label}': expected one of Aluminum, Titanium, Steel")]
    UnknownMaterial { label: String },

    /// Material code outside the closed enumeration
    #[error("unknown material code '{code}': expected 0, 1 or 2")]
    UnknownMaterialCode { code: String },

    /// Feature set does not line up with the schema
    #[error("feature set does not match the model schema: {0}")]
    Mismatch(MismatchDetails),

    /// A field is present but carries the wrong kind of value
    #[error("field '{field}': expected {expected}, got {actual}")]
    InvalidValue {
        field: String,
        expected: String,
        actual: String,
    },

    /// The schema itself is unusable (duplicate names and the like)
    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),
}

impl SchemaError {
    pub fn invalid_value(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        SchemaError::InvalidValue {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Returns true for errors caused by an out-of-enumeration material
    pub fn is_encoding(&self) -> bool {
        matches!(
            self,
            SchemaError::UnknownMaterial { .. } | SchemaError::UnknownMaterialCode { .. }
        )
    }

    /// Returns mismatch details if applicable
    pub fn mismatch(&self) -> Option<&MismatchDetails> {
        match self {
            SchemaError::Mismatch(details) => Some(details),
            _ => None,
        }
    }
}

impl ErrorCode for SchemaError {
    fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownMaterial { .. } | SchemaError::UnknownMaterialCode { .. } => {
                "TOOLWEAR_ENCODING_FAILED"
            }
            SchemaError::Mismatch(_) | SchemaError::InvalidValue { .. } => {
                "TOOLWEAR_SCHEMA_MISMATCH"
            }
            SchemaError::InvalidSchema(_) => "TOOLWEAR_SCHEMA_INVALID",
        }
    }

    fn severity(&self) -> Severity {
        match self {
            SchemaError::InvalidSchema(_) => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

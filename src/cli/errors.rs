//! CLI-specific error types
//!
//! A `CliError` ends the command and the process exits non-zero. Errors
//! coming up from a subsystem keep that subsystem's code.

use std::fmt;
use std::io;

use crate::errors::ErrorCode;
use crate::inference::InferenceError;
use crate::results::ResultLogError;
use crate::training::TrainingError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/files)
    IoError,
    /// Error raised by a subsystem, carrying its own code
    Subsystem(&'static str),
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TOOLWEAR_CLI_CONFIG_ERROR",
            Self::IoError => "TOOLWEAR_CLI_IO_ERROR",
            Self::Subsystem(code) => *code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Wraps any subsystem error, keeping its code
    pub fn from_subsystem<E: ErrorCode + fmt::Display>(e: &E) -> Self {
        Self::new(CliErrorCode::Subsystem(e.code()), e.to_string())
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<TrainingError> for CliError {
    fn from(e: TrainingError) -> Self {
        Self::from_subsystem(&e)
    }
}

impl From<InferenceError> for CliError {
    fn from(e: InferenceError) -> Self {
        Self::from_subsystem(&e)
    }
}

impl From<ResultLogError> for CliError {
    fn from(e: ResultLogError) -> Self {
        Self::from_subsystem(&e)
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

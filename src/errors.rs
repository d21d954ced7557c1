//! Error severity shared by every subsystem
//!
//! Each subsystem keeps its own error type in its `errors.rs`. They all
//! report a stable `TOOLWEAR_*` code and one of the severities below, which
//! is what the request boundary uses to decide between rejecting a single
//! request, warning alongside a result, or halting the process.

use std::fmt;

/// How an error affects the process that observed it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The single request is rejected, the process keeps serving
    Reject,
    /// Reported next to a still-valid result
    Warn,
    /// The process cannot continue
    Fatal,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Reject => "REJECT",
            Severity::Warn => "WARN",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Stable error code plus severity, implemented by every subsystem error
pub trait ErrorCode {
    /// Returns the `TOOLWEAR_*` code string
    fn code(&self) -> &'static str;

    /// Returns the severity level for this error
    fn severity(&self) -> Severity;

    /// Returns whether the process must stop
    fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

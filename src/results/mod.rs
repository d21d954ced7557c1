//! Result log subsystem
//!
//! Every served prediction is appended to a flat CSV file that the
//! insights reader later analyses.
//!
//! # Design Principles
//!
//! - Append-only; rows are never rewritten
//! - The header is written exactly once per file
//! - Unreadable logs self-heal by being reset
//! - Log failures never invalidate a prediction

mod errors;
mod log;
mod record;

pub use errors::{ResultLogError, ResultLogResult};
pub use log::{sort_newest_first, AppendOutcome, LogSnapshot, ResultLog};
pub use record::PredictionRecord;

/// Wall-clock format used for log timestamps and model training stamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log column holding the predicted wear
pub const PREDICTION_COLUMN: &str = "Predicted Tool Wear (µm)";

/// Log column holding the timestamp
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

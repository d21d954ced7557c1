//! Inference subsystem
//!
//! Turns operator-entered machining parameters into a wear prediction and
//! a replace/keep verdict, and records every prediction.
//!
//! # Design Principles
//!
//! - The model is loaded once and passed around explicitly, never global
//! - Fields are aligned by name; nothing is padded, truncated or reordered
//!   silently
//! - A failed request never touches the result log
//! - A failed log write never fails the request

mod engine;
mod errors;
mod outcome;

pub use engine::{InferenceEngine, PredictionRequest, THRESHOLD_KEY};
pub use errors::{InferenceError, InferenceResult};
pub use outcome::{PredictionOutcome, WearOutcome};

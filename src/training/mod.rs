//! Offline training pipeline
//!
//! Turns a labeled CSV dataset into a persisted `TrainedModel`.
//!
//! # Design Principles
//!
//! - Material is encoded through the same enumeration inference uses
//! - Splits and forests are reproducible from the seed
//! - Metrics are diagnostic only; there is no quality gate
//! - A failed run never writes a partial artifact

mod dataset;
mod errors;
mod metrics;
mod pipeline;
mod split;

pub use dataset::{LabeledDataset, TARGET_COLUMN};
pub use errors::{TrainingError, TrainingResult};
pub use metrics::{mean_squared_error, r2_score, EvaluationMetrics};
pub use pipeline::{train, train_and_save, train_dataset, TrainingConfig, TrainingReport};
pub use split::{train_test_split, SplitIndices};

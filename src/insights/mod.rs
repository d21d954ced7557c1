//! Insights over the prediction history
//!
//! Distribution, histogram, correlation and recency views of the result
//! log, plus the model's feature ranking.
//!
//! # Design Principles
//!
//! - Never appends; a corrupted log is reset when it is read
//! - An empty log is `NoData`, never an error
//! - Undefined statistics are absent, never fabricated

mod correlation;
mod histogram;
mod reader;

pub use correlation::{pearson, CorrelationMatrix};
pub use histogram::{Histogram, DEFAULT_BINS};
pub use reader::{feature_ranking, Insight, InsightsReader};

//! Regression model subsystem
//!
//! A random forest of CART regression trees, bound to the feature schema it
//! was trained on and persisted as a checksummed artifact.
//!
//! # Design Principles
//!
//! - Deterministic fitting for a given seed
//! - The schema lives inside the artifact
//! - Artifacts are replaced atomically and verified on load
//! - A loaded model is never mutated

mod artifact;
mod checksum;
mod errors;
mod forest;
mod trained;
mod tree;

pub use artifact::ARTIFACT_FORMAT_VERSION;
pub use checksum::compute_checksum;
pub use errors::{ModelError, ModelResult};
pub use forest::{ForestParams, RandomForest};
pub use trained::TrainedModel;
pub use tree::{Node, RegressionTree, TreeParams};

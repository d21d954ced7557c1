//! toolwear - CNC tool wear prediction
//!
//! Trains a random forest on labeled machining data, answers wear
//! predictions for new parameter sets, and keeps an append-only history of
//! every prediction served.

pub mod cli;
pub mod errors;
pub mod inference;
pub mod insights;
pub mod model;
pub mod observability;
pub mod results;
pub mod schema;
pub mod training;

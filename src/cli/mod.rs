//! CLI module for toolwear
//!
//! Provides command-line interface for:
//! - train: Fit a model from a labeled dataset
//! - predict: One-shot prediction from a stdin request
//! - serve: Load the model once and answer requests line by line
//! - history / insights / importance / export: Read-only reports

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    export, history, importance, insights, predict, run, run_command, serve, serve_loop, train,
};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_response};

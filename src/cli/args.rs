//! CLI argument definitions using clap
//!
//! Commands:
//! - toolwear train [--dataset <path>]
//! - toolwear predict [--threshold <µm>]
//! - toolwear serve [--threshold <µm>]
//! - toolwear history [--limit <n>]
//! - toolwear insights [--bins <n>]
//! - toolwear importance
//! - toolwear export --output <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::insights::DEFAULT_BINS;

/// toolwear - CNC tool wear prediction
#[derive(Parser, Debug)]
#[command(name = "toolwear")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./toolwear.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Train a model and write the artifact
    Train {
        /// Labeled dataset, overriding the configured one
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Predict wear for one JSON request read from stdin
    Predict {
        /// Wear threshold in µm, overriding the configured one
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Load the model once and answer one JSON request per stdin line
    Serve {
        /// Wear threshold in µm, overriding the configured one
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Show the most recent predictions
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the wear distribution and correlation matrix
    Insights {
        #[arg(long, default_value_t = DEFAULT_BINS)]
        bins: usize,
    },

    /// Show feature importances, least important first
    Importance,

    /// Write the full prediction history as CSV
    Export {
        #[arg(long)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predict_with_threshold() {
        let cli = Cli::try_parse_from(["toolwear", "predict", "--threshold", "55.5"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./toolwear.json"));
        assert!(matches!(cli.command, Command::Predict { threshold: Some(t) } if t == 55.5));
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["toolwear", "history", "--config", "/etc/toolwear.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/toolwear.json"));
        assert!(matches!(cli.command, Command::History { limit: 10 }));
    }

    #[test]
    fn test_insights_default_bins() {
        let cli = Cli::try_parse_from(["toolwear", "insights"]).unwrap();
        assert!(matches!(cli.command, Command::Insights { bins: 30 }));
    }

    #[test]
    fn test_export_requires_output() {
        assert!(Cli::try_parse_from(["toolwear", "export"]).is_err());
    }
}

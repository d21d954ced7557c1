//! Configuration file
//!
//! `toolwear.json`, every field optional:
//!
//! ```json
//! {
//!   "model_path": "models/rf_model.json",
//!   "results_path": "results.csv",
//!   "dataset_path": "dataset/tool_wear_prediction_dataset_5000.csv",
//!   "wear_threshold": 60.0,
//!   "training": { "n_trees": 100, "test_fraction": 0.2, "seed": 42 }
//! }
//! ```
//!
//! A missing file means all defaults.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::observability::{log_event, Event};
use crate::training::TrainingConfig;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Trained model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Prediction history log
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,

    /// Labeled training data
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Wear (µm) at or above which a tool is flagged
    #[serde(default = "default_wear_threshold")]
    pub wear_threshold: f64,

    #[serde(default)]
    pub training: TrainingConfig,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/rf_model.json")
}
fn default_results_path() -> PathBuf {
    PathBuf::from("results.csv")
}
fn default_dataset_path() -> PathBuf {
    PathBuf::from("dataset/tool_wear_prediction_dataset_5000.csv")
}
fn default_wear_threshold() -> f64 {
    60.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            results_path: default_results_path(),
            dataset_path: default_dataset_path(),
            wear_threshold: default_wear_threshold(),
            training: TrainingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if absent
    pub fn load(path: &Path) -> CliResult<Self> {
        let (config, source) = match fs::read_to_string(path) {
            Ok(content) => {
                let config: Config = serde_json::from_str(&content).map_err(|e| {
                    CliError::config_error(format!("Invalid config JSON: {}", e))
                })?;
                (config, "file")
            }
            Err(e) if e.kind() == ErrorKind::NotFound => (Config::default(), "defaults"),
            Err(e) => {
                return Err(CliError::config_error(format!(
                    "Failed to read config: {}",
                    e
                )))
            }
        };

        config.validate()?;

        log_event(
            Event::ConfigLoaded,
            &[
                ("model_path", &config.model_path.display().to_string()),
                ("path", &path.display().to_string()),
                ("results_path", &config.results_path.display().to_string()),
                ("source", source),
            ],
        );

        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        if !self.wear_threshold.is_finite() || self.wear_threshold < 0.0 {
            return Err(CliError::config_error(format!(
                "wear_threshold must be a finite number >= 0, got {}",
                self.wear_threshold
            )));
        }

        self.training
            .validate()
            .map_err(|e| CliError::config_error(e.to_string()))?;

        Ok(())
    }
}

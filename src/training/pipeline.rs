//! Training pipeline
//!
//! load -> encode -> split -> fit -> evaluate -> persist. Any failure stops
//! the run before the artifact is touched.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dataset::LabeledDataset;
use super::errors::{TrainingError, TrainingResult};
use super::metrics::EvaluationMetrics;
use super::split::train_test_split;
use crate::model::{ForestParams, RandomForest, TrainedModel};
use crate::observability::{log_event, Event, ObservationScope};

/// Training hyperparameters, the `training` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    pub n_trees: usize,
    /// Fraction of rows held out for evaluation, in `[0, 1)`
    pub test_fraction: f64,
    pub seed: u64,
    pub min_samples_split: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            test_fraction: 0.2,
            seed: 42,
            min_samples_split: 2,
            max_depth: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> TrainingResult<()> {
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(TrainingError::InvalidConfig(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        self.forest_params()
            .validate()
            .map_err(|e| TrainingError::InvalidConfig(e.to_string()))
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            min_samples_split: self.min_samples_split,
            max_depth: self.max_depth,
            seed: self.seed,
        }
    }
}

/// Outcome of a successful training run
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub model: TrainedModel,
    pub metrics: EvaluationMetrics,
}

/// Trains on the dataset at `dataset_path` without persisting.
pub fn train(dataset_path: &Path, config: &TrainingConfig) -> TrainingResult<TrainingReport> {
    observed(dataset_path, None, config)
}

/// Trains and atomically writes the artifact to `artifact_path`.
///
/// The previous artifact, if any, is left untouched unless the whole run
/// succeeds.
pub fn train_and_save(
    dataset_path: &Path,
    artifact_path: &Path,
    config: &TrainingConfig,
) -> TrainingResult<TrainingReport> {
    observed(dataset_path, Some(artifact_path), config)
}

/// Fits and evaluates a model on an already loaded dataset
pub fn train_dataset(
    dataset: &LabeledDataset,
    config: &TrainingConfig,
) -> TrainingResult<TrainingReport> {
    config.validate()?;

    let params = config.forest_params();
    log_event(
        Event::TrainingStart,
        &[
            ("n_trees", &params.n_trees.to_string()),
            ("seed", &params.seed.to_string()),
            ("test_fraction", &config.test_fraction.to_string()),
        ],
    );

    let split = train_test_split(dataset.len(), config.test_fraction, config.seed)?;
    let (train_rows, train_targets) = dataset.subset(&split.train);
    let (test_rows, test_targets) = dataset.subset(&split.test);

    let forest = RandomForest::fit(&train_rows, &train_targets, &params)?;
    let node_count: usize = forest.trees().iter().map(|t| t.node_count()).sum();
    log_event(
        Event::ModelFitted,
        &[
            ("nodes", &node_count.to_string()),
            ("train_rows", &train_rows.len().to_string()),
            ("trees", &forest.n_trees().to_string()),
        ],
    );

    let predicted = test_rows
        .iter()
        .map(|row| forest.predict(row))
        .collect::<Result<Vec<f64>, _>>()?;
    let metrics = EvaluationMetrics::evaluate(&test_targets, &predicted, train_rows.len());
    log_event(
        Event::ModelEvaluated,
        &[
            ("mse", &format_metric(metrics.mse)),
            ("r2", &format_metric(metrics.r2)),
            ("test_rows", &metrics.test_rows.to_string()),
        ],
    );

    let model = TrainedModel::new(dataset.schema().clone(), forest, params, metrics)?;
    Ok(TrainingReport { model, metrics })
}

fn observed(
    dataset_path: &Path,
    artifact_path: Option<&Path>,
    config: &TrainingConfig,
) -> TrainingResult<TrainingReport> {
    let dataset_field = dataset_path.display().to_string();
    let scope = ObservationScope::with_fields("TRAINING", &[("dataset", &dataset_field)]);

    match run(dataset_path, artifact_path, config) {
        Ok(report) => {
            scope.complete_with_fields(&[
                ("mse", &format_metric(report.metrics.mse)),
                ("r2", &format_metric(report.metrics.r2)),
            ]);
            Ok(report)
        }
        Err(e) => {
            scope.fail_fatal(&e.to_string());
            Err(e)
        }
    }
}

fn run(
    dataset_path: &Path,
    artifact_path: Option<&Path>,
    config: &TrainingConfig,
) -> TrainingResult<TrainingReport> {
    config.validate()?;

    let dataset = LabeledDataset::load(dataset_path)?;
    log_event(
        Event::DatasetLoaded,
        &[
            ("features", &dataset.schema().len().to_string()),
            ("path", &dataset_path.display().to_string()),
            ("rows", &dataset.len().to_string()),
        ],
    );

    let report = train_dataset(&dataset, config)?;

    if let Some(path) = artifact_path {
        report.model.save(path)?;
        log_event(
            Event::ArtifactWritten,
            &[("path", &path.display().to_string())],
        );
    }

    Ok(report)
}

fn format_metric(value: Option<f64>) -> String {
    value.map_or_else(|| "absent".to_string(), |v| format!("{:.4}", v))
}

//! Random forest regressor
//!
//! Bagged CART trees: each tree is grown on a bootstrap draw of the training
//! rows and the forest predicts the mean of its trees. The bootstrap draws
//! come from a single `StdRng` seeded from `ForestParams::seed`, so the same
//! data and parameters always produce the same forest.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::errors::{ModelError, ModelResult};
use super::tree::{RegressionTree, TreeParams};

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// A node with fewer samples than this becomes a leaf
    pub min_samples_split: usize,
    /// Maximum tree depth, unlimited when `None`
    pub max_depth: Option<usize>,
    /// Seed for the bootstrap draws
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            min_samples_split: 2,
            max_depth: None,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> ModelResult<()> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidParameter("n_trees must be > 0".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidParameter(
                "min_samples_split must be >= 2".into(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(ModelError::InvalidParameter("max_depth must be > 0".into()));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            min_samples_split: self.min_samples_split,
            max_depth: self.max_depth,
        }
    }
}

/// A fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    /// Fits a forest on row-major `rows` against `targets`.
    ///
    /// # Errors
    ///
    /// - `EmptyTrainingSet` if there are no rows
    /// - `TargetCountMismatch` / `RaggedRow` if shapes disagree
    /// - `InvalidParameter` if `params` are out of range
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], params: &ForestParams) -> ModelResult<Self> {
        params.validate()?;

        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if rows.len() != targets.len() {
            return Err(ModelError::TargetCountMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        let n_features = rows[0].len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(ModelError::RaggedRow {
                row,
                expected: n_features,
                actual: r.len(),
            });
        }

        let n = rows.len();
        let tree_params = params.tree_params();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0; n_features];

        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

            let mut tree_importances = vec![0.0; n_features];
            let tree = RegressionTree::fit(rows, targets, sample, &tree_params, &mut tree_importances);

            normalize(&mut tree_importances);
            for (total, value) in importances.iter_mut().zip(&tree_importances) {
                *total += value;
            }
            trees.push(tree);
        }
        normalize(&mut importances);

        Ok(Self {
            n_features,
            trees,
            importances,
        })
    }

    /// Predicts the target for one feature vector
    pub fn predict(&self, features: &[f64]) -> ModelResult<f64> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Incompatible("forest has no trees".into()));
        }

        let sum: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        let prediction = sum / self.trees.len() as f64;

        if !prediction.is_finite() {
            return Err(ModelError::NonFinitePrediction(prediction));
        }
        Ok(prediction)
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1 (all
    /// zeros if no tree ever split)
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    /// Checks a deserialized forest before it is served
    pub fn validate(&self) -> ModelResult<()> {
        if self.trees.is_empty() {
            return Err(ModelError::Incompatible("forest has no trees".into()));
        }
        if self.importances.len() != self.n_features {
            return Err(ModelError::Incompatible(format!(
                "{} importances for {} features",
                self.importances.len(),
                self.n_features
            )));
        }
        if self.importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ModelError::Incompatible(
                "feature importances must be finite and non-negative".into(),
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| ModelError::Incompatible(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }
}

fn normalize(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    }
}

//! Held-out evaluation metrics

use serde::{Deserialize, Serialize};

/// Diagnostic metrics recorded with a trained model.
///
/// `mse` is absent when nothing was held out; `r2` is additionally absent
/// when the held-out targets have zero variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mse: Option<f64>,
    pub r2: Option<f64>,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl EvaluationMetrics {
    /// Scores predictions against held-out targets
    pub fn evaluate(actual: &[f64], predicted: &[f64], train_rows: usize) -> Self {
        Self {
            mse: mean_squared_error(actual, predicted),
            r2: r2_score(actual, predicted),
            train_rows,
            test_rows: actual.len(),
        }
    }
}

/// Mean of squared residuals; `None` for empty or unequal inputs
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    Some(sum / actual.len() as f64)
}

/// Coefficient of determination; `None` when undefined
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|a| (a - mean) * (a - mean)).sum();
    if ss_tot == 0.0 {
        return None;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

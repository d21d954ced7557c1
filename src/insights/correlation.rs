//! Pearson correlation across logged columns

use serde::Serialize;

/// Square correlation matrix over named columns.
///
/// `values[i][j]` is `None` when column `i` or `j` has zero variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlates equally long columns.
    ///
    /// Returns `None` if every column is constant, since nothing can be
    /// said about any pair.
    pub fn compute(columns: Vec<String>, data: &[Vec<f64>]) -> Option<Self> {
        let stats: Vec<Option<ColumnStats>> = data.iter().map(|c| ColumnStats::of(c)).collect();
        if stats.iter().all(Option::is_none) {
            return None;
        }

        let n = data.len();
        let mut values = vec![vec![None; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = if i == j {
                    stats[i].as_ref().map(|_| 1.0)
                } else {
                    match (&stats[i], &stats[j]) {
                        (Some(a), Some(b)) => Some(pearson_with(&data[i], a, &data[j], b)),
                        _ => None,
                    }
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        Some(Self { columns, values })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient for a pair of named columns
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// Pearson coefficient of two equally long samples; `None` if either is
/// constant or the lengths differ
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    let a = ColumnStats::of(x)?;
    let b = ColumnStats::of(y)?;
    Some(pearson_with(x, &a, y, &b))
}

struct ColumnStats {
    mean: f64,
    /// Root of the sum of squared deviations
    spread: f64,
}

impl ColumnStats {
    fn of(column: &[f64]) -> Option<Self> {
        if column.len() < 2 {
            return None;
        }
        let mean = column.iter().sum::<f64>() / column.len() as f64;
        let ss: f64 = column.iter().map(|v| (v - mean) * (v - mean)).sum();
        if ss == 0.0 || !ss.is_finite() {
            return None;
        }
        Some(Self {
            mean,
            spread: ss.sqrt(),
        })
    }
}

fn pearson_with(x: &[f64], a: &ColumnStats, y: &[f64], b: &ColumnStats) -> f64 {
    let cov: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - a.mean) * (yi - b.mean))
        .sum();
    (cov / (a.spread * b.spread)).clamp(-1.0, 1.0)
}

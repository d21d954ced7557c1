//! Deterministic train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::errors::{TrainingError, TrainingResult};

/// Row indices on each side of the split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with a seeded RNG and holds out `ceil(n * fraction)` rows.
///
/// The same `(n, fraction, seed)` always yields the same split. At least one
/// training row must remain.
pub fn train_test_split(n: usize, fraction: f64, seed: u64) -> TrainingResult<SplitIndices> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(TrainingError::InvalidConfig(format!(
            "test_fraction must be in [0, 1), got {}",
            fraction
        )));
    }
    if n == 0 {
        return Err(TrainingError::InsufficientData("no rows to split".into()));
    }

    let n_test = (n as f64 * fraction).ceil() as usize;
    if n_test >= n {
        return Err(TrainingError::InsufficientData(format!(
            "{} rows leave no training data after holding out {}",
            n, n_test
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices {
        train,
        test: indices,
    })
}

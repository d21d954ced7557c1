//! Equal-width binning of predicted wear

use serde::Serialize;

/// Default bin count for the wear distribution
pub const DEFAULT_BINS: usize = 30;

/// Bin counts over `[min, max]`; the last bin includes `max`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values`. Returns `None` for no values or zero bins.
    ///
    /// When every value is equal the range is widened to `v - 0.5 ..= v + 0.5`
    /// so the bins still have width.
    pub fn build(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }

        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            min -= 0.5;
            max += 0.5;
        }

        let bin_width = (max - min) / bins as f64;
        let mut counts = vec![0; bins];
        for &v in values {
            let index = ((v - min) / bin_width).floor() as usize;
            counts[index.min(bins - 1)] += 1;
        }

        Some(Self {
            min,
            max,
            bin_width,
            counts,
        })
    }

    /// Lower and upper edge of each bin
    pub fn edges(&self) -> Vec<(f64, f64)> {
        (0..self.counts.len())
            .map(|i| {
                let lo = self.min + i as f64 * self.bin_width;
                (lo, lo + self.bin_width)
            })
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

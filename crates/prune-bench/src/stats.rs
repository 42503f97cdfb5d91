//! Summary statistics over repeated trials.
//!
//! A single-sample comparison of latencies is noisy. With `--trials N` the
//! report shows the mean of each metric, its sample standard deviation and
//! the observed range.

/// Descriptive statistics for a set of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator). 0 for one sample.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `samples`. `None` when empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let count = samples.len();
        let mean = samples.iter().sum::<f64>() / count as f64;
        let variance = if count > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64
        } else {
            0.0
        };
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// `mean ± std_dev` with the given precision.
    pub fn display(&self, precision: usize) -> String {
        format!("{:.*} ± {:.*}", precision, self.mean, precision, self.std_dev)
    }

    /// `min..max` with the given precision.
    pub fn range(&self, precision: usize) -> String {
        format!("{:.*}..{:.*}", precision, self.min, precision, self.max)
    }
}

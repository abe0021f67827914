//! Summary statistics over per-iteration samples

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub median: Duration,
    /// Nearest-rank 99th percentile
    pub p99: Duration,
    /// Population standard deviation
    pub std_dev: Duration,
}

impl LatencySummary {
    /// Summarize `samples`. An empty slice yields all-zero statistics.
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        let total: u128 = sorted.iter().map(Duration::as_nanos).sum();
        let mean_ns = total / n as u128;

        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2
        } else {
            sorted[n / 2]
        };

        let variance = sorted
            .iter()
            .map(|s| {
                let d = s.as_nanos() as f64 - mean_ns as f64;
                d * d
            })
            .sum::<f64>()
            / n as f64;

        Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean: nanos(mean_ns),
            median,
            p99: sorted[percentile_rank(n, 99)],
            std_dev: Duration::from_secs_f64(variance.sqrt() / 1e9),
        }
    }
}

/// Index of the nearest-rank percentile in a sorted slice of `n` items
#[inline]
fn percentile_rank(n: usize, pct: usize) -> usize {
    (n * pct).div_ceil(100).saturating_sub(1)
}

#[inline]
fn nanos(ns: u128) -> Duration {
    Duration::from_nanos(u64::try_from(ns).unwrap_or(u64::MAX))
}

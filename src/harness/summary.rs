//! Summary statistics over a run's samples

use crate::error::{OctaneError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Arithmetic mean, always present
pub const AVERAGE: &str = "average";
/// Smallest sample
pub const MIN: &str = "min";
/// Largest sample
pub const MAX: &str = "max";
/// Population standard deviation
pub const STD_DEV: &str = "std_dev";
/// Median (nearest rank)
pub const P50: &str = "p50";
/// 95th percentile (nearest rank)
pub const P95: &str = "p95";
/// 99th percentile (nearest rank)
pub const P99: &str = "p99";

/// Mapping from statistic name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Summary(BTreeMap<String, f64>);

impl Summary {
    /// Compute the summary of a sequence of values.
    ///
    /// Fails with [`OctaneError::InsufficientData`] when `values` is empty.
    pub fn from_values<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Err(OctaneError::InsufficientData(
                "cannot summarise a run with zero samples".to_string(),
            ));
        }

        // Welford: the running mean of identical values never drifts
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (i, &x) in values.iter().enumerate() {
            let delta = x - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (x - mean);
            min = min.min(x);
            max = max.max(x);
        }
        let variance = m2 / values.len() as f64;

        let mut sorted = values;
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut stats = BTreeMap::new();
        stats.insert(AVERAGE.to_string(), mean);
        stats.insert(MIN.to_string(), min);
        stats.insert(MAX.to_string(), max);
        stats.insert(STD_DEV.to_string(), variance.max(0.0).sqrt());
        stats.insert(P50.to_string(), percentile(&sorted, 50.0));
        stats.insert(P95.to_string(), percentile(&sorted, 95.0));
        stats.insert(P99.to_string(), percentile(&sorted, 99.0));

        Ok(Self(stats))
    }

    /// Look up a statistic by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// The arithmetic mean
    pub fn average(&self) -> f64 {
        self.get(AVERAGE).unwrap_or(f64::NAN)
    }

    /// Iterate over all statistics in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of statistics
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no statistic is present
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "  {:<8} {:.3}", name, value)?;
        }
        Ok(())
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct * sorted.len() as f64 / 100.0).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

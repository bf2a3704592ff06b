//! Samples and the values probes produce

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A value a probe can produce.
///
/// Structured readings expose one scalar through [`Measurement::primary`]
/// so the harness can summarise them the same way as plain numbers.
pub trait Measurement: fmt::Display {
    /// The scalar summarised by the harness
    fn primary(&self) -> f64;
}

impl Measurement for f64 {
    fn primary(&self) -> f64 {
        *self
    }
}

/// One timestamped measurement produced by a probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample<V> {
    /// Wall-clock time the probe returned
    pub timestamp: DateTime<Utc>,
    /// Offset from the start of the run
    pub elapsed: Duration,
    /// The measured value
    pub value: V,
}

impl<V> Sample<V> {
    /// Stamp a value taken `elapsed` into a run with the current time
    pub fn new(value: V, elapsed: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            elapsed,
            value,
        }
    }
}

impl<V: fmt::Display> fmt::Display for Sample<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} +{:.3}s] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.elapsed.as_secs_f64(),
            self.value
        )
    }
}

//! The sampling loop
//!
//! A [`Harness`] repeatedly invokes a [`Probe`] until the [`SamplingSpec`]
//! bounds are met, then freezes the samples and their [`Summary`] into a
//! [`RunResult`].
//!
//! The termination test runs *after* each sample, so every valid spec yields
//! at least one sample, even with a zero duration.

use super::cancel::CancelToken;
use super::sample::{Measurement, Sample};
use super::summary::Summary;
use crate::error::{OctaneError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default wait between samples
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// A capability that performs one measurement
pub trait Probe {
    /// Value produced per call
    type Value: Measurement;

    /// Short name used in logs, errors, and result documents
    fn name(&self) -> &str;

    /// Take one measurement
    fn sample(&mut self) -> Result<Self::Value>;
}

/// Adapts a closure into a [`Probe`]
pub struct FnProbe<F> {
    name: String,
    f: F,
}

/// Build a probe from a name and a closure
pub fn probe_fn<V, F>(name: impl Into<String>, f: F) -> FnProbe<F>
where
    V: Measurement,
    F: FnMut() -> Result<V>,
{
    FnProbe {
        name: name.into(),
        f,
    }
}

impl<V, F> Probe for FnProbe<F>
where
    V: Measurement,
    F: FnMut() -> Result<V>,
{
    type Value = V;

    fn name(&self) -> &str {
        &self.name
    }

    fn sample(&mut self) -> Result<V> {
        (self.f)()
    }
}

/// What to sample and for how long
pub struct SamplingSpec<P> {
    /// Stop once this much time has elapsed
    pub duration: Option<Duration>,
    /// Stop once this many samples are collected
    pub max_samples: Option<usize>,
    /// Wait between samples; zero disables waiting
    pub interval: Duration,
    /// Measurement capability
    pub probe: P,
}

impl<P: Probe> SamplingSpec<P> {
    /// Spec with no bounds and the default interval
    pub fn new(probe: P) -> Self {
        Self {
            duration: None,
            max_samples: None,
            interval: DEFAULT_INTERVAL,
            probe,
        }
    }

    /// Bound the run by elapsed time
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Bound the run by sample count
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = Some(max_samples);
        self
    }

    /// Set the wait between samples
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Check that the run would terminate
    pub fn validate(&self) -> Result<()> {
        match (self.duration, self.max_samples) {
            (None, None) => Err(OctaneError::config(
                "sampling spec needs a duration or a max sample count",
            )),
            (_, Some(0)) => Err(OctaneError::config("max sample count must be at least 1")),
            _ => Ok(()),
        }
    }

    fn is_complete(&self, elapsed: Duration, collected: usize) -> bool {
        self.duration.is_some_and(|d| elapsed >= d)
            || self.max_samples.is_some_and(|n| collected >= n)
    }

    fn record(&self) -> SpecRecord {
        SpecRecord {
            probe: self.probe.name().to_string(),
            duration_secs: self.duration.map(|d| d.as_secs_f64()),
            max_samples: self.max_samples,
            interval_secs: self.interval.as_secs_f64(),
        }
    }
}

/// The bounds a run was executed with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecRecord {
    /// Probe name
    pub probe: String,
    /// Duration bound in seconds
    pub duration_secs: Option<f64>,
    /// Sample count bound
    pub max_samples: Option<usize>,
    /// Interval between samples in seconds
    pub interval_secs: f64,
}

/// The frozen outcome of one harness run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult<V> {
    /// Bounds the run was executed with
    pub spec: SpecRecord,
    /// Samples in arrival order
    pub samples: Vec<Sample<V>>,
    /// Statistic name to value
    pub summary: Summary,
}

impl<V> RunResult<V> {
    /// Number of collected samples
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Mean of the primary values
    pub fn average(&self) -> f64 {
        self.summary.average()
    }
}

impl<V: fmt::Display> fmt::Display for RunResult<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} results ===", self.spec.probe)?;
        writeln!(f, "Samples: {}", self.samples.len())?;
        for sample in &self.samples {
            writeln!(f, "  {}", sample)?;
        }
        writeln!(f, "Summary:")?;
        write!(f, "{}", self.summary)
    }
}

/// Runs sampling specs
#[derive(Clone, Default)]
pub struct Harness {
    cancel: CancelToken,
}

impl Harness {
    /// Create a harness with its own cancel token
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a harness driven by an external cancel token
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Get the cancel token for external control
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the spec to completion
    pub fn run<P: Probe>(&self, spec: &mut SamplingSpec<P>) -> Result<RunResult<P::Value>> {
        self.run_with_progress(spec, |_| {})
    }

    /// Run the spec, calling `on_sample` after every collected sample.
    ///
    /// A probe failure aborts the run and discards the samples collected so far.
    pub fn run_with_progress<P, F>(
        &self,
        spec: &mut SamplingSpec<P>,
        mut on_sample: F,
    ) -> Result<RunResult<P::Value>>
    where
        P: Probe,
        F: FnMut(&Sample<P::Value>),
    {
        spec.validate()?;
        info!(
            probe = spec.probe.name(),
            duration = ?spec.duration,
            max_samples = ?spec.max_samples,
            interval = ?spec.interval,
            "Starting sampling run"
        );

        let start = Instant::now();
        let mut samples = Vec::new();

        loop {
            self.cancel.check()?;
            let tick = Instant::now();

            let value = spec.probe.sample()?;
            let sample = Sample::new(value, start.elapsed());
            debug!(probe = spec.probe.name(), value = sample.value.primary(), "Sample collected");
            on_sample(&sample);
            samples.push(sample);

            if spec.is_complete(start.elapsed(), samples.len()) {
                break;
            }

            // Probes that spend time measuring eat into the interval
            self.cancel.wait(spec.interval.saturating_sub(tick.elapsed()))?;
        }

        let summary = Summary::from_values(samples.iter().map(|s| s.value.primary()))?;
        info!(
            probe = spec.probe.name(),
            samples = samples.len(),
            average = summary.average(),
            elapsed = ?start.elapsed(),
            "Sampling run complete"
        );

        Ok(RunResult {
            spec: spec.record(),
            samples,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn constant(value: f64) -> FnProbe<impl FnMut() -> Result<f64>> {
        probe_fn("constant", move || Ok(value))
    }

    fn counting() -> (FnProbe<impl FnMut() -> Result<f64>>, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let probe = probe_fn("counting", move || {
            seen.set(seen.get() + 1);
            Ok(seen.get() as f64)
        });
        (probe, calls)
    }

    #[test]
    fn test_zero_duration_collects_exactly_one_sample() {
        let mut spec = SamplingSpec::new(constant(5.0))
            .with_duration(Duration::ZERO)
            .with_interval(Duration::ZERO);
        let result = Harness::new().run(&mut spec).unwrap();
        assert_eq!(result.sample_count(), 1);
        assert_eq!(result.average(), 5.0);
    }

    #[test]
    fn test_zero_duration_ignores_interval() {
        let mut spec = SamplingSpec::new(constant(1.0))
            .with_duration(Duration::ZERO)
            .with_interval(Duration::from_secs(60));
        let start = Instant::now();
        let result = Harness::new().run(&mut spec).unwrap();
        assert_eq!(result.sample_count(), 1);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_no_bounds_is_config_error_before_sampling() {
        let (probe, calls) = counting();
        let mut spec = SamplingSpec::new(probe).with_interval(Duration::ZERO);
        let err = Harness::new().run(&mut spec).unwrap_err();
        assert!(matches!(err, OctaneError::ConfigError(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_zero_max_samples_rejected() {
        let mut spec = SamplingSpec::new(constant(1.0)).with_max_samples(0);
        assert!(matches!(
            Harness::new().run(&mut spec),
            Err(OctaneError::ConfigError(_))
        ));
    }

    #[test]
    fn test_samples_in_arrival_order() {
        let (probe, _) = counting();
        let mut spec = SamplingSpec::new(probe)
            .with_max_samples(4)
            .with_interval(Duration::ZERO);
        let result = Harness::new().run(&mut spec).unwrap();
        let values: Vec<f64> = result.samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(result.average(), 2.5);
        assert_eq!(result.spec.probe, "counting");
        assert_eq!(result.spec.max_samples, Some(4));
        assert!(result.samples.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_progress_callback_sees_every_sample() {
        let mut seen = Vec::new();
        let mut spec = SamplingSpec::new(constant(3.0))
            .with_max_samples(3)
            .with_interval(Duration::ZERO);
        let result = Harness::new()
            .run_with_progress(&mut spec, |s| seen.push(s.value))
            .unwrap();
        assert_eq!(seen, vec![3.0, 3.0, 3.0]);
        assert_eq!(result.sample_count(), 3);
    }

    #[test]
    fn test_probe_failure_aborts_run() {
        let mut calls = 0;
        let probe = probe_fn("flaky", move || {
            calls += 1;
            if calls == 3 {
                Err(OctaneError::probe("flaky", "device went away"))
            } else {
                Ok(1.0)
            }
        });
        let mut spec = SamplingSpec::new(probe)
            .with_max_samples(10)
            .with_interval(Duration::ZERO);
        let err = Harness::new().run(&mut spec).unwrap_err();
        assert!(err.is_probe_error());
    }

    #[test]
    fn test_duration_bound_stops_run() {
        let mut spec = SamplingSpec::new(constant(2.0))
            .with_duration(Duration::from_millis(50))
            .with_interval(Duration::from_millis(10));
        let result = Harness::new().run(&mut spec).unwrap();
        assert!(result.sample_count() >= 2);
        assert!(result.sample_count() <= 7);
    }

    #[test]
    fn test_sample_offsets_follow_the_schedule() {
        let mut spec = SamplingSpec::new(constant(1.0))
            .with_max_samples(4)
            .with_interval(Duration::from_millis(20));
        let result = Harness::new().run(&mut spec).unwrap();

        let offsets: Vec<Duration> = result.samples.iter().map(|s| s.elapsed).collect();
        assert!(offsets[0] < Duration::from_secs(1));
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        // Three waits of 20 ms separate the first and last samples
        assert!(offsets[3] - offsets[0] >= Duration::from_millis(60));
    }

    #[test]
    fn test_first_bound_reached_wins() {
        let mut spec = SamplingSpec::new(constant(2.0))
            .with_duration(Duration::from_secs(3600))
            .with_max_samples(2)
            .with_interval(Duration::ZERO);
        let result = Harness::new().run(&mut spec).unwrap();
        assert_eq!(result.sample_count(), 2);
    }

    #[test]
    fn test_cancelled_run_returns_cancelled() {
        let harness = Harness::new();
        harness.cancel_token().cancel();
        let (probe, calls) = counting();
        let mut spec = SamplingSpec::new(probe).with_max_samples(5);
        let err = harness.run(&mut spec).unwrap_err();
        assert!(matches!(err, OctaneError::Cancelled));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_cancel_during_wait() {
        let harness = Harness::new();
        let token = harness.cancel_token();
        let probe = probe_fn("cancelling", move || {
            token.cancel();
            Ok(1.0)
        });
        let mut spec = SamplingSpec::new(probe)
            .with_max_samples(5)
            .with_interval(Duration::from_secs(60));
        let start = Instant::now();
        let err = harness.run(&mut spec).unwrap_err();
        assert!(matches!(err, OctaneError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    proptest! {
        #[test]
        fn prop_max_samples_exact(n in 1usize..200) {
            let mut spec = SamplingSpec::new(constant(1.0))
                .with_max_samples(n)
                .with_interval(Duration::ZERO);
            let result = Harness::new().run(&mut spec).unwrap();
            prop_assert_eq!(result.sample_count(), n);
        }

        #[test]
        fn prop_identical_values_mean_exact(value in -1.0e9f64..1.0e9, n in 1usize..50) {
            let mut spec = SamplingSpec::new(constant(value))
                .with_max_samples(n)
                .with_interval(Duration::ZERO);
            let result = Harness::new().run(&mut spec).unwrap();
            prop_assert_eq!(result.average(), value);
        }
    }
}

//! Uniform resource-sampling harness
//!
//! Runs a probe on a fixed schedule, collects timestamped samples,
//! and aggregates them into summary statistics.

mod cancel;
mod sample;
mod sampler;
pub mod summary;

pub use cancel::CancelToken;
pub use sample::{Measurement, Sample};
pub use sampler::{probe_fn, FnProbe, Harness, Probe, RunResult, SamplingSpec, SpecRecord, DEFAULT_INTERVAL};
pub use summary::Summary;

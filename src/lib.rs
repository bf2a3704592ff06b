//! # Octane - Hardware Performance Sampling and Rating
//!
//! Octane runs a probe against an OS or hardware subsystem on a fixed
//! schedule, collects timestamped samples, summarizes them, and writes the
//! result to a sink. One-shot probes cover storage throughput, network
//! interfaces and speed, and GPU devices.
//!
//! ## Features
//!
//! - **Uniform Sampling Harness**: duration and/or count bounds, fixed interval, cancellable waits
//! - **Probe Adapters**: CPU utilization, memory usage, storage throughput, network, GPU
//! - **CPU Compute Benchmark**: single- and multi-core floating-point scores
//! - **Summary Statistics**: mean plus min, max, standard deviation, and percentiles
//! - **Result Sinks**: YAML, JSON, or text to a file, stdout, or memory
//! - **Octane Rating**: log-scaled 70-100 score against baseline hardware tiers
//!
//! ## Quick Start
//!
//! ```no_run
//! use octane::harness::{Harness, SamplingSpec};
//! use octane::probe::cpu::CpuProbe;
//! use std::time::Duration;
//!
//! let mut spec = SamplingSpec::new(CpuProbe::new().unwrap())
//!     .with_duration(Duration::from_secs(10))
//!     .with_interval(Duration::from_secs(1));
//!
//! let result = Harness::new().run(&mut spec).unwrap();
//! println!("Average CPU usage: {:.1}%", result.average());
//! ```
//!
//! ## Writing Results
//!
//! ```no_run
//! use octane::config::OutputFormat;
//! use octane::harness::{Harness, SamplingSpec};
//! use octane::probe::memory::MemoryProbe;
//! use octane::sink::{FileSink, ResultSink};
//!
//! let mut spec = SamplingSpec::new(MemoryProbe::new()).with_max_samples(5);
//! let result = Harness::new().run(&mut spec).unwrap();
//!
//! FileSink::new("memory_test_results.yaml", OutputFormat::Yaml)
//!     .emit(&result)
//!     .unwrap();
//! ```
//!
//! ## Storage Rating
//!
//! ```no_run
//! use octane::probe::storage::{run_storage_test, StorageTestConfig};
//!
//! let config = StorageTestConfig::new("/scratch").with_baseline("high_end");
//! let report = run_storage_test(&config).unwrap();
//! println!("{}", report);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod harness;
pub mod probe;
pub mod progress;
pub mod rating;
pub mod sink;
pub mod system;

// Re-export commonly used types
pub use config::{HarnessConfig, OutputFormat};
pub use error::{OctaneError, Result};
pub use harness::{Harness, Probe, RunResult, Sample, SamplingSpec, Summary};
pub use progress::SamplingProgress;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use octane::prelude::*;
    //! ```

    pub use crate::config::{HarnessConfig, OutputFormat};
    pub use crate::error::{OctaneError, Result};
    pub use crate::harness::{probe_fn, CancelToken, Harness, Measurement, Probe, RunResult, Sample, SamplingSpec, Summary};
    pub use crate::probe::cpu::CpuProbe;
    pub use crate::probe::memory::MemoryProbe;
    pub use crate::probe::scenario::{lookup_scenario, Scenario, ScenarioResult};
    pub use crate::probe::ProbeOutcome;
    pub use crate::rating::{ComponentRating, OctaneGrade};
    pub use crate::sink::{FileSink, MemorySink, ResultSink, StdoutSink};
    pub use crate::system::SystemSnapshot;
}

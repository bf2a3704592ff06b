//! CPU compute benchmark
//!
//! Times a floating-point kernel on one core, then on every worker of a
//! rayon pool, and rates the two scores against the CPU baseline. Each
//! phase gets half of the configured duration.

use crate::error::{OctaneError, Result};
use crate::rating::{self, ComponentRating};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default total benchmark time
pub const DEFAULT_BENCH_DURATION: Duration = Duration::from_secs(10);

/// Kernel iterations between clock checks on the single-core phase
const SINGLE_CORE_BATCH: u32 = 10_000;

/// Kernel iterations between clock checks per multi-core worker
const MULTI_CORE_BATCH: u32 = 5_000;

/// Kernel iterations per score point
const OPS_PER_POINT: f64 = 1000.0;

/// How long and how wide to run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeConfig {
    /// Total run time, split evenly between the two phases
    pub duration: Duration,
    /// Worker threads for the multi-core phase (0 = all logical cores)
    pub threads: usize,
    /// Baseline category used for the rating
    pub baseline: String,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_BENCH_DURATION,
            threads: 0,
            baseline: "default".to_string(),
        }
    }
}

impl ComputeConfig {
    /// Override the total run time
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Override the worker count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Override the baseline category
    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline = baseline.into();
        self
    }

    fn worker_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Compute benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeReport {
    /// Workers used by the multi-core phase
    pub threads: usize,
    /// Seconds given to each phase
    pub phase_secs: f64,
    /// Single-core score (thousands of kernel iterations)
    pub single_core_score: f64,
    /// Multi-core score summed over all workers
    pub multi_core_score: f64,
    /// Octane rating of both scores against the CPU baseline
    pub rating: ComponentRating,
}

impl fmt::Display for ComputeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== CPU Compute Benchmark ===")?;
        writeln!(f, "Threads:     {}", self.threads)?;
        writeln!(f, "Phase time:  {:.1}s", self.phase_secs)?;
        writeln!(f, "Single-core: {:.0} points", self.single_core_score)?;
        writeln!(f, "Multi-core:  {:.0} points", self.multi_core_score)?;
        writeln!(f, "Rating:      {}", self.rating)
    }
}

/// Run `batch` kernel iterations repeatedly until `phase` elapses.
///
/// Returns the number of iterations completed; at least one batch always runs.
fn spin(phase: Duration, batch: u32, kernel: fn(f64) -> f64) -> u64 {
    let start = Instant::now();
    let mut ops = 0u64;
    let mut acc = 0.0f64;
    loop {
        for i in 0..batch {
            let x = black_box(i as f64);
            acc += x.sqrt() * kernel(x);
        }
        ops += batch as u64;
        if start.elapsed() >= phase {
            break;
        }
    }
    black_box(acc);
    ops
}

/// Single-core score for a phase of the given length
pub fn single_core_score(phase: Duration) -> f64 {
    spin(phase, SINGLE_CORE_BATCH, f64::sin) as f64 / OPS_PER_POINT
}

/// Multi-core score: every worker spins for `phase`, iterations are summed
pub fn multi_core_score(threads: usize, phase: Duration) -> Result<f64> {
    let threads = threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| OctaneError::probe("compute", format!("thread pool: {}", e)))?;

    let ops: u64 = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|_| spin(phase, MULTI_CORE_BATCH, f64::cos))
            .sum()
    });
    Ok(ops as f64 / OPS_PER_POINT)
}

/// Run both phases and rate the result
pub fn run_compute_benchmark(config: &ComputeConfig) -> Result<ComputeReport> {
    let threads = config.worker_count();
    let phase = config.duration / 2;
    info!(threads, phase = ?phase, "Starting CPU compute benchmark");

    let single = single_core_score(phase);
    debug!(score = single, "Single-core phase complete");
    let multi = multi_core_score(threads, phase)?;
    debug!(score = multi, "Multi-core phase complete");

    let baseline = rating::baseline(&config.baseline).cpu;
    Ok(ComputeReport {
        threads,
        phase_secs: phase.as_secs_f64(),
        single_core_score: single,
        multi_core_score: multi,
        rating: ComponentRating::from_ron(rating::cpu_ron(single, multi, baseline)),
    })
}

//! Progress reporter implementation
//!
//! Uses indicatif to show a sampling run as it happens:
//! - Sample count against the count bound, or a spinner for timed runs
//! - Each sample printed above the bar
//! - Elapsed time

use crate::config::HarnessConfig;
use crate::harness::Sample;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Progress display for one sampling run
pub struct SamplingProgress {
    /// Bar or spinner
    bar: ProgressBar,
    /// Samples recorded so far
    recorded: AtomicU64,
    /// Is progress enabled
    enabled: AtomicBool,
}

impl SamplingProgress {
    /// Create a progress display for a run of `probe` bounded by `config`
    pub fn new(probe: &str, config: &HarnessConfig) -> Self {
        let bar = match config.max_samples {
            Some(total) => {
                let bar = ProgressBar::new(total as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} samples ({elapsed})")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("=> "),
                );
                bar
            }
            None => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {prefix:.bold.dim} {pos} samples ({elapsed}) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar.enable_steady_tick(Duration::from_millis(120));
                bar
            }
        };
        bar.set_prefix(probe.to_string());

        if let Some(duration) = config.duration {
            bar.set_message(format!("of {}", humantime::format_duration(duration)));
        }

        Self {
            bar,
            recorded: AtomicU64::new(0),
            enabled: AtomicBool::new(true),
        }
    }

    /// Create a disabled progress display (for quiet mode)
    pub fn disabled() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_draw_target(ProgressDrawTarget::hidden());
        Self {
            bar,
            recorded: AtomicU64::new(0),
            enabled: AtomicBool::new(false),
        }
    }

    /// Record one sample and print it above the bar
    pub fn record<V: fmt::Display>(&self, sample: &Sample<V>) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        self.bar.inc(1);
        if self.is_enabled() {
            self.bar.println(sample.to_string());
        }
    }

    /// Number of samples recorded
    pub fn recorded(&self) -> u64 {
        self.recorded.load(Ordering::Relaxed)
    }

    /// Finish progress with success message
    pub fn finish_success(&self, message: &str) {
        self.bar.finish_with_message(format!("✓ {}", message));
    }

    /// Finish progress with error message
    pub fn finish_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("✗ {}", message));
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

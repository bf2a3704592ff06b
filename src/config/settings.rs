//! Configuration settings for Octane
//!
//! Defines the CLI arguments, output formats, and the runtime sampling
//! configuration derived from them.

use crate::harness::{Probe, SamplingSpec, DEFAULT_INTERVAL};
use crate::probe::compute::{ComputeConfig, DEFAULT_BENCH_DURATION};
use crate::probe::gpu::DEFAULT_VECTOR_LEN;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default sampling duration for CPU and memory runs
pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);

/// Octane - hardware performance sampling and rating
#[derive(Parser, Debug, Clone)]
#[command(name = "octane")]
#[command(author = "Octane Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sample, summarize, and rate hardware performance")]
#[command(long_about = r#"
Octane samples CPU and memory usage on a fixed schedule, runs one-shot
storage, network, and GPU measurements, and rates the results.

Examples:
  octane cpu                              # 60 samples, one per second
  octane memory --duration 5m --interval 10s
  octane cpu --samples 10 --format json   # Count-bounded run
  octane storage --path /scratch --size 1G
  octane professional gaming
  octane system-info
"#)]
pub struct CliArgs {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Output format for result files
    #[arg(short = 'f', long, value_enum, default_value = "yaml", global = true)]
    pub format: OutputFormat,

    /// Directory result files are written into
    #[arg(short = 'o', long, default_value = ".", value_name = "DIR", global = true)]
    pub output_dir: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sample global CPU utilization, or run the compute benchmark
    #[command(name = "cpu")]
    Cpu {
        #[command(flatten)]
        sampling: SamplingArgs,
        #[command(flatten)]
        benchmark: BenchmarkArgs,
    },

    /// Sample memory usage
    #[command(name = "memory")]
    Memory {
        #[command(flatten)]
        sampling: SamplingArgs,
    },

    /// Measure write/read throughput of a directory's filesystem
    #[command(name = "storage")]
    Storage {
        /// Directory the test file is written into
        #[arg(short, long, default_value = ".", value_name = "DIR")]
        path: PathBuf,
        /// Payload size (e.g., 100M, 1G)
        #[arg(short, long, default_value = "100M", value_parser = parse_size, value_name = "SIZE")]
        size: u64,
        /// Baseline category for the rating
        #[arg(short, long, default_value = "default", value_name = "CATEGORY")]
        baseline: String,
    },

    /// Enumerate interfaces and run a speed test
    #[command(name = "network")]
    Network {
        /// Skip the external speed test
        #[arg(long)]
        no_speedtest: bool,
        /// Baseline category for the download rating
        #[arg(short, long, default_value = "default", value_name = "CATEGORY")]
        baseline: String,
    },

    /// Query GPUs and time a vector multiply
    #[command(name = "gpu")]
    Gpu {
        /// Length of each multiplied vector
        #[arg(long, default_value_t = DEFAULT_VECTOR_LEN, value_name = "LEN")]
        vector_len: usize,
    },

    /// Show scores for a professional workload (prompts when omitted)
    #[command(name = "professional")]
    Professional {
        /// Scenario: gaming, ai, server, or workstation
        scenario: Option<String>,
    },

    /// Collect a system information snapshot
    #[command(name = "system-info")]
    SystemInfo,
}

/// Bounds for a sampling run
#[derive(Args, Debug, Clone, Default)]
pub struct SamplingArgs {
    /// Run length (e.g., 60, 90s, 5m); defaults to 60s unless --samples is given
    #[arg(short, long, value_parser = parse_duration, value_name = "DURATION")]
    pub duration: Option<Duration>,

    /// Wait between samples (e.g., 1s, 500ms, 0)
    #[arg(short, long, default_value = "1s", value_parser = parse_duration, value_name = "DURATION")]
    pub interval: Duration,

    /// Stop after this many samples
    #[arg(short = 'n', long, value_name = "NUM")]
    pub samples: Option<usize>,
}

/// CPU compute benchmark options
#[derive(Args, Debug, Clone)]
pub struct BenchmarkArgs {
    /// Run the compute benchmark instead of sampling utilization
    #[arg(long)]
    pub benchmark: bool,

    /// Total benchmark time, split between the single- and multi-core phases
    #[arg(long, default_value = "10s", value_parser = parse_duration, value_name = "DURATION")]
    pub bench_duration: Duration,

    /// Multi-core worker threads (0 = all logical cores)
    #[arg(short = 't', long, default_value_t = 0, value_name = "NUM")]
    pub threads: usize,

    /// Baseline category for the rating
    #[arg(short, long, default_value = "default", value_name = "CATEGORY")]
    pub baseline: String,
}

impl Default for BenchmarkArgs {
    fn default() -> Self {
        Self {
            benchmark: false,
            bench_duration: DEFAULT_BENCH_DURATION,
            threads: 0,
            baseline: "default".to_string(),
        }
    }
}

impl BenchmarkArgs {
    /// Benchmark configuration for these options
    pub fn compute_config(&self) -> ComputeConfig {
        ComputeConfig::default()
            .with_duration(self.bench_duration)
            .with_threads(self.threads)
            .with_baseline(self.baseline.as_str())
    }
}

/// Output format for result files
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// YAML document
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
    /// Human-readable text
    Text,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

/// Result file path for `stem` in `dir`
pub fn results_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Runtime sampling configuration derived from CLI args
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Duration bound
    pub duration: Option<Duration>,
    /// Sample count bound
    pub max_samples: Option<usize>,
    /// Wait between samples
    pub interval: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            duration: Some(DEFAULT_DURATION),
            max_samples: None,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl HarnessConfig {
    /// Create config from CLI arguments.
    ///
    /// A count given on its own makes the run count-bounded only.
    pub fn from_cli(args: &SamplingArgs) -> Self {
        let duration = match (args.duration, args.samples) {
            (None, None) => Some(DEFAULT_DURATION),
            (duration, _) => duration,
        };

        Self {
            duration,
            max_samples: args.samples,
            interval: args.interval,
        }
    }

    /// Build a sampling spec for `probe`
    pub fn spec<P: Probe>(&self, probe: P) -> SamplingSpec<P> {
        SamplingSpec {
            duration: self.duration,
            max_samples: self.max_samples,
            interval: self.interval,
            probe,
        }
    }
}

/// Parse a duration: bare numbers are seconds, otherwise humantime syntax
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Empty duration string".to_string());
    }

    if let Ok(secs) = value.parse::<f64>() {
        if !secs.is_finite() || secs < 0.0 {
            return Err(format!("Invalid duration: {}", value));
        }
        return Ok(Duration::from_secs_f64(secs));
    }

    humantime::parse_duration(value).map_err(|e| format!("Invalid duration '{}': {}", value, e))
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num <= 0.0 {
        return Err(format!("Size must be positive: {}", size));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("100M").unwrap(), crate::probe::storage::DEFAULT_PAYLOAD_SIZE as u64);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("1.5G").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert!(parse_size("0").is_err());
        assert!(parse_size("lots").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("60").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("0.5").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_harness_defaults() {
        let args = CliArgs::try_parse_from(["octane", "cpu"]).unwrap();
        let Commands::Cpu { sampling, benchmark } = args.command else {
            panic!("expected cpu command");
        };
        assert_eq!(HarnessConfig::from_cli(&sampling), HarnessConfig::default());
        assert!(!benchmark.benchmark);
        assert_eq!(benchmark.bench_duration, BenchmarkArgs::default().bench_duration);
        assert_eq!(args.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_cpu_benchmark_args() {
        let args = CliArgs::try_parse_from([
            "octane", "cpu", "--benchmark", "--bench-duration", "4s", "-t", "2", "-b", "high_end",
        ])
        .unwrap();
        let Commands::Cpu { benchmark, .. } = args.command else {
            panic!("expected cpu command");
        };
        assert!(benchmark.benchmark);
        let config = benchmark.compute_config();
        assert_eq!(config.duration, Duration::from_secs(4));
        assert_eq!(config.threads, 2);
        assert_eq!(config.baseline, "high_end");
    }

    #[test]
    fn test_network_baseline_arg() {
        let args = CliArgs::try_parse_from(["octane", "network", "--no-speedtest", "--baseline", "enthusiast"]).unwrap();
        match args.command {
            Commands::Network { no_speedtest, baseline } => {
                assert!(no_speedtest);
                assert_eq!(baseline, "enthusiast");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_samples_only_is_count_bounded() {
        let args = CliArgs::try_parse_from(["octane", "memory", "--samples", "5", "--interval", "0"]).unwrap();
        let Commands::Memory { sampling } = args.command else {
            panic!("expected memory command");
        };
        let config = HarnessConfig::from_cli(&sampling);
        assert_eq!(config.duration, None);
        assert_eq!(config.max_samples, Some(5));
        assert_eq!(config.interval, Duration::ZERO);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["octane", "system-info", "--format", "json", "-o", "/tmp/out"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_storage_args() {
        let args = CliArgs::try_parse_from(["octane", "storage", "--size", "1M"]).unwrap();
        match args.command {
            Commands::Storage { path, size, baseline } => {
                assert_eq!(path, PathBuf::from("."));
                assert_eq!(size, 1024 * 1024);
                assert_eq!(baseline, "default");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_results_path() {
        let path = results_path(Path::new("out"), "cpu_test_results", OutputFormat::Yaml);
        assert_eq!(path, PathBuf::from("out/cpu_test_results.yaml"));
        assert_eq!(OutputFormat::Json.extension(), "json");
    }
}

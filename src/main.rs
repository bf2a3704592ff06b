//! Octane CLI - Hardware Performance Sampling
//!
//! Samples, summarizes, and rates CPU, memory, storage, network, and GPU.

use clap::Parser;
use octane::config::{results_path, CliArgs, Commands, HarnessConfig, OutputFormat};
use octane::error::{IoResultExt, Result};
use octane::harness::{Harness, Measurement, Probe};
use octane::probe::compute::{run_compute_benchmark, ComputeConfig};
use octane::probe::cpu::CpuProbe;
use octane::probe::gpu::run_gpu_probe;
use octane::probe::memory::MemoryProbe;
use octane::probe::network::run_network_test;
use octane::probe::scenario::{lookup_scenario, Scenario};
use octane::probe::storage::{run_storage_test, StorageTestConfig};
use octane::probe::ProbeOutcome;
use octane::progress::SamplingProgress;
use octane::sink::{FileSink, ResultSink, StdoutSink};
use octane::system::SystemSnapshot;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Initialize logging
    init_logging(&args);

    // Handle result
    if let Err(e) = run(&args, &Harness::new()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(args: &CliArgs) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(args: &CliArgs, harness: &Harness) -> Result<()> {
    match &args.command {
        Commands::Cpu { benchmark, .. } if benchmark.benchmark => cmd_compute(&benchmark.compute_config(), args),
        Commands::Cpu { sampling, .. } => {
            let config = HarnessConfig::from_cli(sampling);
            cmd_sample(harness, CpuProbe::new()?, &config, args, "cpu_test_results")
        }
        Commands::Memory { sampling } => {
            let config = HarnessConfig::from_cli(sampling);
            cmd_sample(harness, MemoryProbe::new(), &config, args, "memory_test_results")
        }
        Commands::Storage { path, size, baseline } => cmd_storage(path, *size, baseline, args),
        Commands::Network { no_speedtest, baseline } => cmd_network(!*no_speedtest, baseline, args),
        Commands::Gpu { vector_len } => cmd_gpu(*vector_len, args),
        Commands::Professional { scenario } => cmd_professional(scenario.as_deref(), args),
        Commands::SystemInfo => cmd_system_info(args),
    }
}

fn cmd_sample<P>(harness: &Harness, probe: P, config: &HarnessConfig, args: &CliArgs, stem: &str) -> Result<()>
where
    P: Probe,
    P::Value: Serialize + fmt::Display,
{
    let name = probe.name().to_string();
    let mut spec = config.spec(probe);

    // Ctrl-C stops the sampling loop at its next wait. Other commands keep
    // the default SIGINT behaviour.
    let token = harness.cancel_token();
    if let Err(e) = ctrlc::set_handler(move || token.cancel()) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let progress = if args.quiet {
        SamplingProgress::disabled()
    } else {
        SamplingProgress::new(&name, config)
    };

    let result = match harness.run_with_progress(&mut spec, |sample| progress.record(sample)) {
        Ok(result) => {
            progress.finish_success(&format!("{} samples", result.sample_count()));
            result
        }
        Err(e) => {
            progress.finish_error(&e.to_string());
            return Err(e);
        }
    };

    let path = results_path(&args.output_dir, stem, args.format);
    FileSink::new(&path, args.format).emit(&result)?;

    if !args.quiet {
        if let Some(last) = result.samples.last() {
            println!("\nLast {} reading: {} (primary {:.2})", name, last.value, last.value.primary());
        }
        println!("Summary:");
        print!("{}", result.summary);
        println!("Results saved to {}", path.display());
    }

    Ok(())
}

fn cmd_storage(path: &Path, size: u64, baseline: &str, args: &CliArgs) -> Result<()> {
    let config = StorageTestConfig::new(path)
        .with_payload_size(size as usize)
        .with_baseline(baseline);

    if !args.quiet {
        println!(
            "Writing and reading {} in {}...",
            humansize::format_size(size, humansize::BINARY),
            path.display()
        );
    }

    let report = run_storage_test(&config)?;

    let out = results_path(&args.output_dir, "storage_test_results", args.format);
    FileSink::new(&out, args.format).emit(&report)?;

    if !args.quiet {
        print!("{}", report);
        println!("Grade: {}", report.rating.styled_grade());
        println!("Results saved to {}", out.display());
    }

    Ok(())
}

fn cmd_compute(config: &ComputeConfig, args: &CliArgs) -> Result<()> {
    if !args.quiet {
        println!(
            "Running CPU compute benchmark for {}...",
            humantime::format_duration(config.duration)
        );
    }

    let report = run_compute_benchmark(config)?;

    let out = results_path(&args.output_dir, "cpu_benchmark_results", args.format);
    FileSink::new(&out, args.format).emit(&report)?;

    if !args.quiet {
        print!("{}", report);
        println!("Grade: {}", report.rating.styled_grade());
        println!("Results saved to {}", out.display());
    }

    Ok(())
}

fn cmd_network(speedtest: bool, baseline: &str, args: &CliArgs) -> Result<()> {
    let report = run_network_test(speedtest, baseline);

    if !args.quiet {
        StdoutSink::new(OutputFormat::Text).emit(&report)?;
    }

    if !report.is_success() {
        if let Some(reason) = report.interfaces.reason() {
            eprintln!("Network interface enumeration failed: {}", reason);
        }
        if let Some(reason) = report.speedtest.as_ref().and_then(|s| s.reason()) {
            eprintln!("Speed test failed: {}", reason);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_gpu(vector_len: usize, args: &CliArgs) -> Result<()> {
    match run_gpu_probe(vector_len) {
        ProbeOutcome::Success { value } => {
            if !args.quiet {
                StdoutSink::new(OutputFormat::Text).emit(&value)?;
            }
            Ok(())
        }
        ProbeOutcome::Failed { reason } => {
            eprintln!("GPU test failed: {}", reason);
            std::process::exit(1);
        }
    }
}

fn cmd_professional(scenario: Option<&str>, args: &CliArgs) -> Result<()> {
    let name = match scenario {
        Some(name) => name.to_string(),
        None => prompt_scenario()?,
    };

    let result = lookup_scenario(&name)?;
    if !args.quiet {
        StdoutSink::new(OutputFormat::Text).emit(&result)?;
    }

    Ok(())
}

fn prompt_scenario() -> Result<String> {
    println!("Select a professional scenario:");
    for scenario in Scenario::ALL {
        println!("  - {}", scenario);
    }
    print!("Scenario: ");
    std::io::stdout().flush().with_path("<stdout>")?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).with_path("<stdin>")?;
    Ok(line.trim().to_string())
}

fn cmd_system_info(args: &CliArgs) -> Result<()> {
    let snapshot = SystemSnapshot::collect()?;

    if !args.quiet {
        snapshot.print_summary();
    }

    // Always written in both structured formats
    for format in [OutputFormat::Yaml, OutputFormat::Json] {
        let path = results_path(&args.output_dir, "system_info", format);
        FileSink::new(&path, format).emit(&snapshot)?;
        if !args.quiet {
            println!("System information saved to {}", path.display());
        }
    }

    Ok(())
}

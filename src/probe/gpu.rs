//! GPU probe
//!
//! Enumerates devices through `nvidia-smi` and times one vector multiply
//! per device. No tensor runtime is linked, so the multiply runs on the host
//! across the rayon pool.

use super::{run_utility, ProbeOutcome};
use crate::error::{OctaneError, Result};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Device query utility
pub const NVIDIA_SMI: &str = "nvidia-smi";

/// Default vector length for the timed multiply
pub const DEFAULT_VECTOR_LEN: usize = 10_000;

const QUERY_FIELDS: &str =
    "--query-gpu=index,name,memory.total,memory.free,memory.used,temperature.gpu,utilization.gpu";

const MIB: u64 = 1024 * 1024;

/// Static information about one GPU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuDevice {
    /// Device index
    pub index: u32,
    /// Device name
    pub name: String,
    /// Total memory in bytes
    pub memory_total: Option<u64>,
    /// Free memory in bytes
    pub memory_free: Option<u64>,
    /// Used memory in bytes
    pub memory_used: Option<u64>,
    /// Temperature in degrees Celsius
    pub temperature: Option<f64>,
    /// Utilization percent
    pub utilization: Option<f64>,
    /// Seconds taken by the timed vector multiply
    pub compute_seconds: Option<f64>,
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GPU {}: {}", self.index, self.name)?;
        if let (Some(total), Some(used)) = (self.memory_total, self.memory_used) {
            writeln!(
                f,
                "  Memory: {} used of {}",
                humansize::format_size(used, humansize::BINARY),
                humansize::format_size(total, humansize::BINARY)
            )?;
        }
        if let Some(temp) = self.temperature {
            writeln!(f, "  Temperature: {:.0} C", temp)?;
        }
        if let Some(util) = self.utilization {
            writeln!(f, "  Utilization: {:.0}%", util)?;
        }
        if let Some(secs) = self.compute_seconds {
            writeln!(f, "  Vector multiply: {:.6}s", secs)?;
        }
        Ok(())
    }
}

/// GPU test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpuReport {
    /// Length of each multiplied vector
    pub vector_len: usize,
    /// Enumerated devices
    pub devices: Vec<GpuDevice>,
}

impl fmt::Display for GpuReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== GPU Test ===")?;
        writeln!(f, "Devices: {}", self.devices.len())?;
        for device in &self.devices {
            write!(f, "{}", device)?;
        }
        Ok(())
    }
}

fn optional_field(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('[') || raw.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(raw)
    }
}

fn mib_field(raw: &str) -> Option<u64> {
    optional_field(raw)?.parse::<u64>().ok().map(|v| v * MIB)
}

fn float_field(raw: &str) -> Option<f64> {
    optional_field(raw)?.parse::<f64>().ok()
}

/// Parse `nvidia-smi --format=csv,noheader,nounits` output.
///
/// Memory columns are MiB and converted to bytes. `[N/A]` columns become `None`.
pub fn parse_nvidia_smi_csv(output: &str) -> Result<Vec<GpuDevice>> {
    let mut devices = Vec::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 7 {
            return Err(OctaneError::probe(
                "gpu",
                format!("unexpected nvidia-smi line: '{}'", line.trim()),
            ));
        }

        let index = fields[0].trim().parse::<u32>().map_err(|_| {
            OctaneError::probe("gpu", format!("invalid device index '{}'", fields[0].trim()))
        })?;

        // Names may contain commas; numeric columns are always the last five
        let tail = fields.len() - 5;
        let name = fields[1..tail].join(",").trim().to_string();

        devices.push(GpuDevice {
            index,
            name,
            memory_total: mib_field(fields[tail]),
            memory_free: mib_field(fields[tail + 1]),
            memory_used: mib_field(fields[tail + 2]),
            temperature: float_field(fields[tail + 3]),
            utilization: float_field(fields[tail + 4]),
            compute_seconds: None,
        });
    }

    Ok(devices)
}

/// Query all GPUs through `nvidia-smi`
pub fn enumerate_devices() -> Result<Vec<GpuDevice>> {
    let stdout = run_utility("gpu", NVIDIA_SMI, &[QUERY_FIELDS, "--format=csv,noheader,nounits"])?;
    parse_nvidia_smi_csv(&stdout)
}

/// Multiply two random vectors of length `len` and time it
pub fn time_vector_multiply(len: usize) -> Duration {
    let mut rng = rand::thread_rng();
    let a: Vec<f32> = (0..len).map(|_| rng.gen()).collect();
    let b: Vec<f32> = (0..len).map(|_| rng.gen()).collect();

    let start = Instant::now();
    let product: f32 = a.par_iter().zip(b.par_iter()).map(|(x, y)| x * y).sum();
    let elapsed = start.elapsed();

    debug!(len, product = std::hint::black_box(product), "Vector multiply complete");
    elapsed
}

/// Enumerate devices and time one multiply per device
pub fn gpu_report(vector_len: usize) -> Result<GpuReport> {
    info!("Querying GPU devices...");
    let mut devices = enumerate_devices()?;
    if devices.is_empty() {
        return Err(OctaneError::probe("gpu", "no GPU devices found"));
    }

    for device in &mut devices {
        device.compute_seconds = Some(time_vector_multiply(vector_len).as_secs_f64());
    }

    Ok(GpuReport { vector_len, devices })
}

/// Run the GPU probe, capturing failure as a described outcome
pub fn run_gpu_probe(vector_len: usize) -> ProbeOutcome<GpuReport> {
    gpu_report(vector_len).into()
}

//! CPU utilization probe

use crate::error::{OctaneError, Result};
use crate::harness::Probe;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

/// Reads global CPU utilization, in percent, once per call.
///
/// Each reading covers the time since the previous call, so under the
/// harness it reports usage over one sampling interval.
pub struct CpuProbe {
    system: System,
}

impl CpuProbe {
    /// Create the probe and take the first reference reading.
    ///
    /// Blocks for sysinfo's minimum update interval so the first sample
    /// is meaningful.
    pub fn new() -> Result<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(OctaneError::probe("cpu", "CPU statistics are not supported on this platform"));
        }

        let mut system = System::new();
        system.refresh_cpu_usage();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);

        Ok(Self { system })
    }
}

impl Probe for CpuProbe {
    type Value = f64;

    fn name(&self) -> &str {
        "cpu"
    }

    fn sample(&mut self) -> Result<f64> {
        self.system.refresh_cpu_usage();
        let usage = self.system.global_cpu_usage() as f64;
        if !usage.is_finite() {
            return Err(OctaneError::probe("cpu", format!("invalid usage reading: {}", usage)));
        }
        Ok(usage.clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_usage_in_range() {
        let mut probe = CpuProbe::new().unwrap();
        for _ in 0..2 {
            let usage = probe.sample().unwrap();
            assert!((0.0..=100.0).contains(&usage));
        }
        assert_eq!(probe.name(), "cpu");
    }
}

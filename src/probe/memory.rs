//! Virtual memory probe

use crate::error::{OctaneError, Result};
use crate::harness::{Measurement, Probe};
use crate::system::percent_of;
use serde::{Deserialize, Serialize};
use std::fmt;
use sysinfo::System;

/// One memory reading, in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryReading {
    /// Used memory
    pub used_memory: u64,
    /// Memory available for new allocations
    pub available_memory: u64,
    /// Total physical memory
    pub total_memory: u64,
    /// Used share of total, in percent
    pub memory_percent: f64,
}

impl Measurement for MemoryReading {
    fn primary(&self) -> f64 {
        self.memory_percent
    }
}

impl fmt::Display for MemoryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% used ({} / {}, {} available)",
            self.memory_percent,
            humansize::format_size(self.used_memory, humansize::BINARY),
            humansize::format_size(self.total_memory, humansize::BINARY),
            humansize::format_size(self.available_memory, humansize::BINARY),
        )
    }
}

/// Reads system memory usage once per call
pub struct MemoryProbe {
    system: System,
}

impl MemoryProbe {
    /// Create a memory probe
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }
}

impl Default for MemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for MemoryProbe {
    type Value = MemoryReading;

    fn name(&self) -> &str {
        "memory"
    }

    fn sample(&mut self) -> Result<MemoryReading> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(OctaneError::probe("memory", "total memory reported as zero"));
        }
        let used = self.system.used_memory();

        Ok(MemoryReading {
            used_memory: used,
            available_memory: self.system.available_memory(),
            total_memory: total,
            memory_percent: percent_of(used, total),
        })
    }
}

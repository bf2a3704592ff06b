//! System resource detection
//!
//! Collects a one-shot snapshot of the OS, CPU, memory, disk,
//! and network interfaces of the current host.

use crate::error::Result;
use crate::harness::Probe;
use crate::probe::cpu::CpuProbe;
use crate::probe::network::{collect_interfaces, InterfaceInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use sysinfo::System;

/// Complete system information snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    /// Operating system name
    pub os: String,
    /// Operating system version
    pub os_version: String,
    /// Kernel version
    pub kernel_version: String,
    /// CPU architecture
    pub architecture: String,
    /// Host name
    pub hostname: String,
    /// Boot time as seconds since the unix epoch
    pub boot_time: u64,
    /// CPU information
    pub cpu: CpuInfo,
    /// Memory information
    pub memory: MemoryInfo,
    /// Root filesystem usage
    pub disk: Option<StorageInfo>,
    /// Network interfaces
    pub network: Vec<InterfaceInfo>,
}

/// CPU information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    /// Number of physical cores
    pub physical_cores: usize,
    /// Total number of logical CPUs
    pub logical_cores: usize,
    /// CPU model name
    pub model: String,
    /// Vendor (Intel, AMD, ARM, etc.)
    pub vendor: String,
    /// CPU frequency in MHz (if available)
    pub frequency_mhz: Option<u64>,
    /// Global utilization percent over one measurement window
    pub usage: f64,
}

/// Memory information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Total physical memory in bytes
    pub total: u64,
    /// Available memory in bytes
    pub available: u64,
    /// Used memory in bytes
    pub used: u64,
    /// Used share of total, in percent
    pub percent: f64,
}

/// Usage of the filesystem holding a path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Mount point path
    pub mount_point: String,
    /// Device name/path
    pub device: String,
    /// Filesystem type
    pub fs_type: String,
    /// Total space in bytes
    pub total: u64,
    /// Used space in bytes
    pub used: u64,
    /// Free space in bytes
    pub free: u64,
    /// Used share of total, in percent
    pub percent: f64,
    /// Is this a remote/network filesystem?
    pub is_remote: bool,
}

impl SystemSnapshot {
    /// Collect complete system information.
    ///
    /// Blocks for one CPU measurement window to report utilization.
    pub fn collect() -> Result<Self> {
        let mut sys = System::new_all();
        sys.refresh_all();

        let mut cpu_probe = CpuProbe::new()?;
        let usage = cpu_probe.sample()?;

        Ok(SystemSnapshot {
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            hostname: hostname::get()
                .map(|h| h.to_string_lossy().to_string())
                .unwrap_or_else(|_| "localhost".to_string()),
            boot_time: System::boot_time(),
            cpu: CpuInfo::collect(&sys, usage),
            memory: MemoryInfo::collect(&sys),
            disk: StorageInfo::for_path(Path::new("/")),
            network: collect_interfaces().unwrap_or_default(),
        })
    }

    /// Print system summary to console
    pub fn print_summary(&self) {
        print!("{}", self);
    }
}

impl fmt::Display for SystemSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== System Information ===\n")?;

        writeln!(f, "OS:           {} {}", self.os, self.os_version)?;
        writeln!(f, "Kernel:       {}", self.kernel_version)?;
        writeln!(f, "Architecture: {}", self.architecture)?;
        writeln!(f, "Hostname:     {}", self.hostname)?;

        writeln!(f, "\nCPU:")?;
        writeln!(f, "  Model: {}", self.cpu.model)?;
        writeln!(f, "  Logical cores: {}", self.cpu.logical_cores)?;
        writeln!(f, "  Physical cores: {}", self.cpu.physical_cores)?;
        if let Some(freq) = self.cpu.frequency_mhz {
            writeln!(f, "  Frequency: {} MHz", freq)?;
        }
        writeln!(f, "  Usage: {:.1}%", self.cpu.usage)?;

        writeln!(f, "\nMemory:")?;
        writeln!(f, "  Total: {}", humansize::format_size(self.memory.total, humansize::BINARY))?;
        writeln!(f, "  Available: {}", humansize::format_size(self.memory.available, humansize::BINARY))?;
        writeln!(
            f,
            "  Used: {} ({:.1}%)",
            humansize::format_size(self.memory.used, humansize::BINARY),
            self.memory.percent
        )?;

        if let Some(disk) = &self.disk {
            writeln!(f, "\nDisk ({}):", disk.mount_point)?;
            writeln!(f, "  Device: {}", disk.device)?;
            if disk.is_remote {
                writeln!(f, "  Filesystem: {} (network)", disk.fs_type)?;
            } else {
                writeln!(f, "  Filesystem: {}", disk.fs_type)?;
            }
            writeln!(f, "  Total: {}", humansize::format_size(disk.total, humansize::BINARY))?;
            writeln!(f, "  Free: {}", humansize::format_size(disk.free, humansize::BINARY))?;
            writeln!(f, "  Used: {:.1}%", disk.percent)?;
        }

        if !self.network.is_empty() {
            writeln!(f, "\nNetwork:")?;
            for iface in &self.network {
                writeln!(f, "  {}", iface)?;
            }
        }
        Ok(())
    }
}

impl CpuInfo {
    /// Collect CPU information
    pub fn collect(sys: &System, usage: f64) -> Self {
        let cpus = sys.cpus();

        let model = cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let frequency_mhz = cpus.first().map(|c| c.frequency()).filter(|f| *f > 0);

        let vendor = cpus
            .first()
            .map(|c| c.vendor_id().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        CpuInfo {
            physical_cores: num_cpus::get_physical(),
            logical_cores: num_cpus::get(),
            model,
            vendor,
            frequency_mhz,
            usage,
        }
    }
}

impl MemoryInfo {
    /// Collect memory information
    pub fn collect(sys: &System) -> Self {
        let total = sys.total_memory();
        let used = sys.used_memory();
        MemoryInfo {
            total,
            available: sys.available_memory(),
            used,
            percent: percent_of(used, total),
        }
    }
}

impl StorageInfo {
    /// Get storage usage for the filesystem containing `path`
    pub fn for_path(path: &Path) -> Option<Self> {
        use sysinfo::Disks;

        let disks = Disks::new_with_refreshed_list();

        // Longest mount point that prefixes the path wins
        let mut best_match: Option<&sysinfo::Disk> = None;
        let mut best_len = 0;

        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        for disk in disks.iter() {
            let mount = disk.mount_point();
            let mount_len = mount.as_os_str().len();
            if path.starts_with(mount) && (best_match.is_none() || mount_len > best_len) {
                best_match = Some(disk);
                best_len = mount_len;
            }
        }

        best_match.map(|disk| {
            let fs_type = disk.file_system().to_string_lossy().to_string();
            let total = disk.total_space();
            let free = disk.available_space();
            let used = total.saturating_sub(free);

            StorageInfo {
                mount_point: disk.mount_point().to_string_lossy().to_string(),
                device: disk.name().to_string_lossy().to_string(),
                is_remote: Self::is_remote_fs(&fs_type),
                fs_type,
                total,
                used,
                free,
                percent: percent_of(used, total),
            }
        })
    }

    /// Check if filesystem is a remote/network type
    fn is_remote_fs(fs_type: &str) -> bool {
        let fs_lower = fs_type.to_lowercase();
        ["nfs", "cifs", "smb", "fuse", "sshfs", "gpfs", "lustre", "gluster", "ceph", "beegfs"]
            .iter()
            .any(|remote| fs_lower.contains(remote))
    }
}

/// `part` as a percentage of `whole`, zero when `whole` is zero
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_snapshot_collection() {
        let info = SystemSnapshot::collect().unwrap();
        assert!(info.cpu.logical_cores > 0);
        assert!(info.memory.total > 0);
        assert!(info.memory.percent >= 0.0 && info.memory.percent <= 100.0);
        assert!(!info.architecture.is_empty());
        assert!(info.to_string().contains("System Information"));
    }

    #[test]
    fn test_remote_fs_detection() {
        assert!(StorageInfo::is_remote_fs("nfs4"));
        assert!(StorageInfo::is_remote_fs("cifs"));
        assert!(StorageInfo::is_remote_fs("lustre"));
        assert!(!StorageInfo::is_remote_fs("ext4"));
        assert!(!StorageInfo::is_remote_fs("xfs"));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(50, 200), 25.0);
        assert_eq!(percent_of(1, 0), 0.0);
    }

    #[test]
    fn test_storage_for_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        if let Some(info) = StorageInfo::for_path(dir.path()) {
            assert!(info.used <= info.total);
            assert!(info.percent <= 100.0);
        }
    }
}

//! Storage throughput probe
//!
//! A one-shot timed write-then-read of a random payload on the target
//! filesystem. The test file is removed afterwards, including on failure.

use crate::error::{IoResultExt, OctaneError, Result};
use crate::rating::{self, ComponentRating};
use crate::system::StorageInfo;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default payload size (100 MiB)
pub const DEFAULT_PAYLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Name of the temporary file written into the target directory
pub const TEST_FILE_NAME: &str = "storage_test_file.tmp";

const WRITE_CHUNK: usize = 1024 * 1024;

/// Where and how much to write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageTestConfig {
    /// Directory the test file is written into
    pub target: PathBuf,
    /// Payload size in bytes
    pub payload_size: usize,
    /// Baseline category used for the rating
    pub baseline: String,
}

impl StorageTestConfig {
    /// Test `target` with the default payload size
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            payload_size: DEFAULT_PAYLOAD_SIZE,
            baseline: "default".to_string(),
        }
    }

    /// Override the payload size
    pub fn with_payload_size(mut self, payload_size: usize) -> Self {
        self.payload_size = payload_size;
        self
    }

    /// Override the baseline category
    pub fn with_baseline(mut self, baseline: impl Into<String>) -> Self {
        self.baseline = baseline.into();
        self
    }
}

/// Raw write/read timings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StorageThroughput {
    /// Seconds spent writing and syncing the payload
    pub write_seconds: f64,
    /// Seconds spent reading it back
    pub read_seconds: f64,
}

/// Storage test report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageReport {
    /// Directory that was tested
    pub target: PathBuf,
    /// Payload size in bytes
    pub payload_bytes: usize,
    /// Filesystem type of the target, when it could be resolved
    pub filesystem: Option<String>,
    /// Target lives on a network filesystem
    pub remote_filesystem: bool,
    /// Disk usage percent before the test
    pub initial_usage: Option<f64>,
    /// Disk usage percent after the test
    pub final_usage: Option<f64>,
    /// Seconds spent writing
    pub write_time: f64,
    /// Seconds spent reading
    pub read_time: f64,
    /// Write speed in MB/s
    pub write_mbps: f64,
    /// Read speed in MB/s
    pub read_mbps: f64,
    /// Octane rating of the mean of write and read speed
    pub rating: ComponentRating,
}

impl fmt::Display for StorageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Storage Test ===")?;
        writeln!(f, "Target:        {}", self.target.display())?;
        writeln!(f, "Payload:       {}", humansize::format_size(self.payload_bytes as u64, humansize::BINARY))?;
        if let Some(fs) = &self.filesystem {
            if self.remote_filesystem {
                writeln!(f, "Filesystem:    {} (network filesystem, speeds include network time)", fs)?;
            } else {
                writeln!(f, "Filesystem:    {}", fs)?;
            }
        }
        if let Some(usage) = self.initial_usage {
            writeln!(f, "Initial usage: {:.1}%", usage)?;
        }
        if let Some(usage) = self.final_usage {
            writeln!(f, "Final usage:   {:.1}%", usage)?;
        }
        writeln!(f, "Write:         {:.2}s ({:.1} MB/s)", self.write_time, self.write_mbps)?;
        writeln!(f, "Read:          {:.2}s ({:.1} MB/s)", self.read_time, self.read_mbps)?;
        writeln!(f, "Rating:        {}", self.rating)
    }
}

/// Time writing then reading `payload_size` random bytes in `target`
pub fn measure_storage_throughput(target: &Path, payload_size: usize) -> Result<StorageThroughput> {
    if !target.is_dir() {
        return Err(OctaneError::probe(
            "storage",
            format!("target '{}' is not a directory", target.display()),
        ));
    }

    let test_file = target.join(TEST_FILE_NAME);
    let result = timed_write_read(&test_file, payload_size);

    // Cleanup
    let _ = std::fs::remove_file(&test_file);

    result.map_err(|e| match e {
        OctaneError::Io { path, source } => {
            OctaneError::probe("storage", format!("I/O failure at '{}': {}", path.display(), source))
        }
        other => other,
    })
}

fn timed_write_read(test_file: &Path, payload_size: usize) -> Result<StorageThroughput> {
    let mut chunk = vec![0u8; WRITE_CHUNK.min(payload_size.max(1))];
    rand::thread_rng().fill_bytes(&mut chunk);

    // Write test
    let write_start = Instant::now();
    {
        let mut file = File::create(test_file).with_path(test_file)?;
        let mut remaining = payload_size;
        while remaining > 0 {
            let to_write = remaining.min(chunk.len());
            file.write_all(&chunk[..to_write]).with_path(test_file)?;
            remaining -= to_write;
        }
        file.sync_all().with_path(test_file)?;
    }
    let write_seconds = write_start.elapsed().as_secs_f64();
    debug!(write_seconds, "Write phase complete");

    // Read test, reusing the write chunk as the read buffer
    let read_start = Instant::now();
    let read_back = read_in_chunks(test_file, &mut chunk)?;
    let read_seconds = read_start.elapsed().as_secs_f64();
    debug!(read_seconds, "Read phase complete");

    if read_back != payload_size as u64 {
        return Err(OctaneError::probe(
            "storage",
            format!("read back {} bytes, expected {}", read_back, payload_size),
        ));
    }

    Ok(StorageThroughput {
        write_seconds,
        read_seconds,
    })
}

/// Read `path` to the end through `buffer`, returning the byte count
fn read_in_chunks(path: &Path, buffer: &mut [u8]) -> Result<u64> {
    let mut file = File::open(path).with_path(path)?;
    let mut total = 0u64;
    loop {
        match file.read(buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => total += n as u64,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(OctaneError::io(path, e)),
        }
    }
}

/// Run the full storage test: usage before, throughput, usage after
pub fn run_storage_test(config: &StorageTestConfig) -> Result<StorageReport> {
    info!(path = %config.target.display(), size = config.payload_size, "Starting storage test");

    let before = StorageInfo::for_path(&config.target);
    if let Some(info) = before.as_ref().filter(|info| info.is_remote) {
        warn!(
            path = %config.target.display(),
            fs_type = %info.fs_type,
            "Target is on a network filesystem; throughput includes network time"
        );
    }

    let throughput = measure_storage_throughput(&config.target, config.payload_size)?;
    let after = StorageInfo::for_path(&config.target);

    Ok(build_report(config, before, after, throughput))
}

fn build_report(
    config: &StorageTestConfig,
    before: Option<StorageInfo>,
    after: Option<StorageInfo>,
    throughput: StorageThroughput,
) -> StorageReport {
    let megabytes = config.payload_size as f64 / (1024.0 * 1024.0);
    let write_mbps = mbps(megabytes, throughput.write_seconds);
    let read_mbps = mbps(megabytes, throughput.read_seconds);
    let baseline = rating::baseline(&config.baseline).storage;

    StorageReport {
        target: config.target.clone(),
        payload_bytes: config.payload_size,
        remote_filesystem: before.as_ref().is_some_and(|info| info.is_remote),
        initial_usage: before.as_ref().map(|info| info.percent),
        filesystem: before.map(|info| info.fs_type),
        final_usage: after.map(|info| info.percent),
        write_time: throughput.write_seconds,
        read_time: throughput.read_seconds,
        write_mbps,
        read_mbps,
        rating: ComponentRating::rate((write_mbps + read_mbps) / 2.0, baseline),
    }
}

fn mbps(megabytes: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        megabytes / seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_measure_throughput_and_cleanup() {
        let dir = TempDir::new().unwrap();
        let result = measure_storage_throughput(dir.path(), 256 * 1024).unwrap();
        assert!(result.write_seconds >= 0.0);
        assert!(result.read_seconds >= 0.0);
        assert!(!dir.path().join(TEST_FILE_NAME).exists());
    }

    #[test]
    fn test_payload_larger_than_chunk() {
        let dir = TempDir::new().unwrap();
        let size = WRITE_CHUNK * 2 + 17;
        measure_storage_throughput(dir.path(), size).unwrap();
        assert!(!dir.path().join(TEST_FILE_NAME).exists());
    }

    #[test]
    fn test_read_in_chunks_counts_every_byte() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        let size = WRITE_CHUNK * 3 + 5;
        std::fs::write(&path, vec![7u8; size]).unwrap();

        let mut buffer = vec![0u8; WRITE_CHUNK];
        assert_eq!(read_in_chunks(&path, &mut buffer).unwrap(), size as u64);
        // Buffer never grows past one chunk
        assert_eq!(buffer.len(), WRITE_CHUNK);
    }

    #[test]
    fn test_read_in_chunks_small_buffer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("payload.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let mut buffer = [0u8; 3];
        assert_eq!(read_in_chunks(&path, &mut buffer).unwrap(), 10);
    }

    #[test]
    fn test_read_in_chunks_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let mut buffer = [0u8; 16];
        let err = read_in_chunks(&dir.path().join("gone"), &mut buffer).unwrap_err();
        assert!(err.path().is_some());
    }

    fn disk(fs_type: &str, is_remote: bool, percent: f64) -> StorageInfo {
        StorageInfo {
            mount_point: "/mnt/scratch".to_string(),
            device: "server:/export".to_string(),
            fs_type: fs_type.to_string(),
            total: 1000,
            used: (percent * 10.0) as u64,
            free: 1000 - (percent * 10.0) as u64,
            percent,
            is_remote,
        }
    }

    fn timings() -> StorageThroughput {
        StorageThroughput {
            write_seconds: 0.5,
            read_seconds: 0.25,
        }
    }

    #[test]
    fn test_report_flags_network_filesystem() {
        let config = StorageTestConfig::new("/mnt/scratch").with_payload_size(100 * 1024 * 1024);
        let report = build_report(&config, Some(disk("nfs4", true, 40.0)), Some(disk("nfs4", true, 41.0)), timings());

        assert!(report.remote_filesystem);
        assert_eq!(report.filesystem.as_deref(), Some("nfs4"));
        assert_eq!(report.initial_usage, Some(40.0));
        assert_eq!(report.final_usage, Some(41.0));
        assert_eq!(report.write_mbps, 200.0);
        assert_eq!(report.read_mbps, 400.0);
        assert!(report.to_string().contains("network filesystem"));
    }

    #[test]
    fn test_report_local_filesystem() {
        let config = StorageTestConfig::new("/data");
        let report = build_report(&config, Some(disk("ext4", false, 10.0)), None, timings());

        assert!(!report.remote_filesystem);
        assert!(report.final_usage.is_none());
        let text = report.to_string();
        assert!(text.contains("ext4"));
        assert!(!text.contains("network filesystem"));
    }

    #[test]
    fn test_report_unknown_filesystem() {
        let config = StorageTestConfig::new("/data");
        let report = build_report(&config, None, None, timings());
        assert!(!report.remote_filesystem);
        assert!(report.filesystem.is_none());
    }

    #[test]
    fn test_missing_target_is_probe_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = measure_storage_throughput(&missing, 1024).unwrap_err();
        assert!(err.is_probe_error());
    }

    #[test]
    fn test_run_storage_test_report() {
        let dir = TempDir::new().unwrap();
        let config = StorageTestConfig::new(dir.path()).with_payload_size(512 * 1024);
        let report = run_storage_test(&config).unwrap();
        assert_eq!(report.payload_bytes, 512 * 1024);
        assert!(report.rating.ron >= rating::MIN_RON);
        assert!(report.rating.ron <= rating::MAX_RON);
        assert!(report.to_string().contains("Storage Test"));
    }

    #[test]
    fn test_mbps_zero_duration() {
        assert_eq!(mbps(100.0, 0.0), 0.0);
        assert_eq!(mbps(100.0, 2.0), 50.0);
    }
}

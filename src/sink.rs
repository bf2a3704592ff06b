//! Result sinks
//!
//! A sink takes a finished report and persists or displays it. Files are
//! always overwritten; nothing is ever appended.

use crate::config::OutputFormat;
use crate::error::{IoResultExt, OctaneError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Render a report in the given format
pub fn render<R>(report: &R, format: OutputFormat) -> Result<String>
where
    R: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Text => Ok(report.to_string()),
    }
}

/// Destination for finished reports
pub trait ResultSink {
    /// Persist or display one report
    fn emit<R>(&mut self, report: &R) -> Result<()>
    where
        R: Serialize + fmt::Display;
}

/// Writes each report to a file, replacing its contents
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Sink writing `format` documents to `path`
    pub fn new(path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for FileSink {
    fn emit<R>(&mut self, report: &R) -> Result<()>
    where
        R: Serialize + fmt::Display,
    {
        let rendered = render(report, self.format)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_path(parent)?;
        }
        std::fs::write(&self.path, rendered).with_path(&self.path)?;
        info!(path = %self.path.display(), "Results written");
        Ok(())
    }
}

/// Prints each report to stdout
#[derive(Debug, Clone, Copy)]
pub struct StdoutSink {
    format: OutputFormat,
}

impl StdoutSink {
    /// Sink printing `format` documents
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl ResultSink for StdoutSink {
    fn emit<R>(&mut self, report: &R) -> Result<()>
    where
        R: Serialize + fmt::Display,
    {
        let rendered = render(report, self.format)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .and_then(|_| stdout.flush())
            .with_path("<stdout>")
    }
}

/// Keeps the last emitted report in memory
#[derive(Debug, Clone)]
pub struct MemorySink {
    format: OutputFormat,
    buffer: String,
}

impl MemorySink {
    /// Empty in-memory sink
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            buffer: String::new(),
        }
    }

    /// The rendered contents of the last report
    pub fn contents(&self) -> &str {
        &self.buffer
    }
}

impl ResultSink for MemorySink {
    fn emit<R>(&mut self, report: &R) -> Result<()>
    where
        R: Serialize + fmt::Display,
    {
        self.buffer = render(report, self.format)?;
        Ok(())
    }
}

/// Read a report back from a YAML or JSON document
pub fn load_results<T: DeserializeOwned>(path: &Path, format: OutputFormat) -> Result<T> {
    let contents = std::fs::read_to_string(path).with_path(path)?;
    parse_results(&contents, format)
}

/// Parse a rendered YAML or JSON report
pub fn parse_results<T: DeserializeOwned>(contents: &str, format: OutputFormat) -> Result<T> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::from_str(contents)?),
        OutputFormat::Json => Ok(serde_json::from_str(contents)?),
        OutputFormat::Text => Err(OctaneError::config("text output cannot be read back")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{probe_fn, Harness, RunResult, SamplingSpec};
    use std::time::Duration;
    use tempfile::TempDir;

    fn sample_run() -> RunResult<f64> {
        let mut values = [12.5, 40.0, 33.25, 7.0].into_iter().cycle();
        let probe = probe_fn("cpu", move || Ok(values.next().unwrap_or(0.0)));
        let mut spec = SamplingSpec::new(probe)
            .with_max_samples(4)
            .with_interval(Duration::ZERO);
        Harness::new().run(&mut spec).unwrap()
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpu_test_results.yaml");
        let run = sample_run();

        FileSink::new(&path, OutputFormat::Yaml).emit(&run).unwrap();
        let loaded: RunResult<f64> = load_results(&path, OutputFormat::Yaml).unwrap();

        assert_eq!(loaded.sample_count(), run.sample_count());
        assert_eq!(loaded.summary, run.summary);
    }

    #[test]
    fn test_file_sink_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "stale contents that are longer than the report ".repeat(100)).unwrap();

        let run = sample_run();
        FileSink::new(&path, OutputFormat::Json).emit(&run).unwrap();

        let loaded: RunResult<f64> = load_results(&path, OutputFormat::Json).unwrap();
        assert_eq!(loaded.samples, run.samples);
        assert_eq!(loaded.spec, run.spec);
        assert!((loaded.average() - run.average()).abs() < 1e-9);
    }

    #[test]
    fn test_file_sink_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("results.yaml");
        FileSink::new(&path, OutputFormat::Yaml).emit(&sample_run()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_memory_sink_text() {
        let mut sink = MemorySink::new(OutputFormat::Text);
        sink.emit(&sample_run()).unwrap();
        assert!(sink.contents().contains("=== cpu results ==="));
        assert!(sink.contents().contains("Samples: 4"));
    }

    #[test]
    fn test_text_cannot_be_read_back() {
        let err = parse_results::<RunResult<f64>>("anything", OutputFormat::Text).unwrap_err();
        assert!(matches!(err, OctaneError::ConfigError(_)));
    }

    #[test]
    fn test_write_under_a_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("results.yaml");

        let err = FileSink::new(&path, OutputFormat::Yaml).emit(&sample_run()).unwrap_err();
        assert!(err.path().is_some());
    }
}

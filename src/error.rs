//! Error types for Octane
//!
//! This module defines all error types used throughout the application,
//! from harness configuration problems to probe and sink failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Octane operations
#[derive(Error, Debug)]
pub enum OctaneError {
    /// Sampling spec or CLI configuration is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The underlying subsystem call failed (permissions, driver, missing utility)
    #[error("Probe '{probe}' failed: {message}")]
    ProbeError { probe: String, message: String },

    /// Summary requested over zero samples
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Unknown professional scenario name
    #[error("Invalid scenario '{0}' (expected one of: gaming, ai, server, workstation)")]
    InvalidScenario(String),

    /// I/O error while writing or reading results
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Result document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Run interrupted before completion
    #[error("Operation cancelled")]
    Cancelled,
}

impl OctaneError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a probe error
    pub fn probe(probe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProbeError {
            probe: probe.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Check if this error came from a probe
    pub fn is_probe_error(&self) -> bool {
        matches!(self, Self::ProbeError { .. })
    }

    /// Get the path associated with this error, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Result type alias for Octane operations
pub type Result<T> = std::result::Result<T, OctaneError>;

impl From<std::io::Error> for OctaneError {
    fn from(err: std::io::Error) -> Self {
        OctaneError::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OctaneError {
    fn from(err: serde_json::Error) -> Self {
        OctaneError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for OctaneError {
    fn from(err: serde_yaml::Error) -> Self {
        OctaneError::Serialization(err.to_string())
    }
}

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| OctaneError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_with_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = OctaneError::io("/test/path", io_err);
        assert!(err.path().is_some());
        assert_eq!(err.path().unwrap(), &PathBuf::from("/test/path"));
    }

    #[test]
    fn test_with_path_extension() {
        let res: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let err = res.with_path("/results/cpu.yaml").unwrap_err();
        assert_eq!(err.path().unwrap(), &PathBuf::from("/results/cpu.yaml"));
    }

    #[test]
    fn test_error_messages() {
        let err = OctaneError::probe("cpu", "no permission");
        assert!(err.is_probe_error());
        assert_eq!(err.to_string(), "Probe 'cpu' failed: no permission");

        let err = OctaneError::InvalidScenario("unknown".to_string());
        assert!(err.to_string().contains("unknown"));
        assert!(!err.is_probe_error());
    }
}

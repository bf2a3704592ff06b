//! Probe adapters
//!
//! Each adapter wraps one OS or hardware subsystem:
//!
//! - [`cpu`] and [`memory`] implement [`crate::harness::Probe`] and are
//!   driven by the sampling harness.
//! - [`storage`], [`network`], and [`gpu`] are one-shot measurements.
//! - [`compute`] is a timed CPU benchmark rated against the CPU baseline.
//! - [`scenario`] is a pure lookup of canned professional workload scores.

pub mod compute;
pub mod cpu;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod scenario;
pub mod storage;

use crate::error::OctaneError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome of a one-shot probe whose failure the caller may tolerate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeOutcome<T> {
    /// The probe produced a value
    Success {
        /// Measured value
        value: T,
    },
    /// The probe failed; the reason is kept for display
    Failed {
        /// Description of the failure
        reason: String,
    },
}

impl<T> ProbeOutcome<T> {
    /// Convert a probe result, logging the failure
    pub fn from_result(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success { value },
            Err(e) => {
                warn!("{}", e);
                Self::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// True when the probe produced a value
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failed { .. } => None,
        }
    }

    /// The failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { reason } => Some(reason),
        }
    }

    /// Discard the failure reason
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failed { .. } => None,
        }
    }
}

impl<T> From<crate::error::Result<T>> for ProbeOutcome<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        Self::from_result(result)
    }
}

/// Run an external utility and return its stdout.
///
/// A missing binary or non-zero exit becomes a probe error naming the utility.
pub(crate) fn run_utility(probe: &str, program: &str, args: &[&str]) -> crate::error::Result<String> {
    use std::process::{Command, Stdio};

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| OctaneError::probe(probe, format!("failed to run '{}': {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(OctaneError::probe(
            probe,
            format!("'{}' exited with {}: {}", program, output.status, stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let ok: ProbeOutcome<u32> = Ok(7).into();
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&7));
        assert_eq!(ok.into_option(), Some(7));

        let failed: ProbeOutcome<u32> = Err(OctaneError::probe("net", "unreachable")).into();
        assert!(!failed.is_success());
        assert!(failed.reason().unwrap().contains("unreachable"));
        assert_eq!(failed.into_option(), None);
    }

    #[test]
    fn test_missing_utility_is_probe_error() {
        let err = run_utility("test", "octane-definitely-not-installed", &[]).unwrap_err();
        assert!(err.is_probe_error());
        assert!(err.to_string().contains("octane-definitely-not-installed"));
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let failed: ProbeOutcome<u32> = ProbeOutcome::Failed {
            reason: "boom".to_string(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
    }
}

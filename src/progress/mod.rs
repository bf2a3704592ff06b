//! Progress reporting module
//!
//! Provides real-time display of sampling runs with a per-sample log
//! above an indicatif bar.

mod reporter;

pub use reporter::*;

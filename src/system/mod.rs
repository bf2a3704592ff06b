//! System analysis and resource detection module
//!
//! Provides a one-shot snapshot of host resources for the `system-info`
//! report and for disk usage around the storage probe.

mod resources;

pub use resources::*;

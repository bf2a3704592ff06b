//! Configuration module for Octane
//!
//! Provides CLI arguments, output formats, and runtime sampling settings.

mod settings;

pub use settings::*;

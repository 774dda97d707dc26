//! Parsing and validation of `vpw.toml` harness configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`HarnessConfig`]: the package name the trace file is derived from, the
//! clock port, trace settings, clock-period trace offsets and snapshot scope.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;

//! Configuration types deserialized from `vpw.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use vpw_common::Timescale;

/// The top-level harness configuration parsed from `vpw.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Package metadata: trace file stem, top module and clock port.
    pub package: PackageConfig,
    /// Waveform trace settings.
    #[serde(default)]
    pub trace: TraceConfig,
    /// Clock period and trace offsets around each edge.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Which ports a snapshot covers.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl HarnessConfig {
    /// Builds a configuration with defaults for everything but the package name.
    pub fn for_package(name: impl Into<String>) -> Self {
        Self {
            package: PackageConfig {
                name: name.into(),
                module: None,
                clock: default_clock_port(),
            },
            trace: TraceConfig::default(),
            clock: ClockConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }

    /// Returns the path of the waveform file: `<trace.dir>/<package.name>.vcd`.
    pub fn trace_path(&self) -> PathBuf {
        self.trace.dir.join(format!("{}.vcd", self.package.name))
    }

    /// Returns the top module name, falling back to the package name.
    pub fn module(&self) -> &str {
        self.package.module.as_deref().unwrap_or(&self.package.name)
    }
}

/// Package metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageConfig {
    /// The package identifier; the trace file is named `<name>.vcd`.
    pub name: String,
    /// The top module of the design; defaults to `name`.
    #[serde(default)]
    pub module: Option<String>,
    /// The clock port driven by the sequencer.
    #[serde(default = "default_clock_port")]
    pub clock: String,
}

fn default_clock_port() -> String {
    "clk".to_string()
}

/// Waveform trace settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Whether `init` opens a trace recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Hierarchy depth handed to the model when binding the recorder.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Directory the trace file is written to.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// The `$timescale` of the trace.
    #[serde(default)]
    pub timescale: Timescale,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            depth: default_depth(),
            dir: default_dir(),
            timescale: Timescale::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_depth() -> u32 {
    99
}

fn default_dir() -> PathBuf {
    Path::new(".").to_path_buf()
}

/// Clock period and the trace offsets placed around each edge.
///
/// For tick number `t` (starting at 1) the three trace frames are dumped at
/// `t * period - setup`, `t * period` and `t * period + hold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Trace time units per clock period.
    #[serde(default = "default_period")]
    pub period: u64,
    /// Offset of the settle frame before the rising edge.
    #[serde(default = "default_setup")]
    pub setup: u64,
    /// Offset of the falling-edge frame after the rising edge.
    #[serde(default = "default_hold")]
    pub hold: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            setup: default_setup(),
            hold: default_hold(),
        }
    }
}

fn default_period() -> u64 {
    10
}

fn default_setup() -> u64 {
    2
}

fn default_hold() -> u64 {
    5
}

/// Which ports a snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SnapshotConfig {
    /// Include input ports alongside outputs and bidirectional fields.
    #[serde(default = "default_true")]
    pub include_inputs: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            include_inputs: true,
        }
    }
}

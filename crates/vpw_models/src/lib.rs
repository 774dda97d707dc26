//! Reference circuit models for the vpw harness.
//!
//! Each model is a plain struct with one field per port, a
//! `port_registry!` declaration and a [`SimModel`](vpw_sim::SimModel)
//! implementation. They stand in for compiled designs in the CLI's `sim`
//! command and in end-to-end tests. [`RegFile`] and [`AxiBridge`] expose AXI
//! ports for exercising bus agents.

#![warn(missing_docs)]

pub mod axi_bridge;
pub mod bram;
pub mod counter;
pub mod loopback;
pub mod regfile;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use axi_bridge::AxiBridge;
pub use bram::Bram;
pub use counter::Counter;
pub use loopback::Loopback;
pub use regfile::RegFile;

/// The reference models selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// [`Bram`]
    Bram,
    /// [`Counter`]
    Counter,
    /// [`Loopback`]
    Loopback,
    /// [`RegFile`]
    #[serde(rename = "regfile")]
    RegFile,
    /// [`AxiBridge`]
    #[serde(rename = "axi_bridge")]
    AxiBridge,
}

impl ModelKind {
    /// Every reference model.
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Bram,
        ModelKind::Counter,
        ModelKind::Loopback,
        ModelKind::RegFile,
        ModelKind::AxiBridge,
    ];

    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Bram => "bram",
            ModelKind::Counter => "counter",
            ModelKind::Loopback => "loopback",
            ModelKind::RegFile => "regfile",
            ModelKind::AxiBridge => "axi_bridge",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for a model name that matches no reference model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model '{0}' (expected one of: bram, counter, loopback, regfile, axi_bridge)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        model_by_name(s).ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Looks up a reference model by its command-line name, ignoring case.
pub fn model_by_name(name: &str) -> Option<ModelKind> {
    ModelKind::ALL
        .into_iter()
        .find(|k| k.name().eq_ignore_ascii_case(name))
}

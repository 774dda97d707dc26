//! Clock-stepped simulation harness for cycle-accurate circuit models.
//!
//! The harness drives a model one clock period at a time, exposes its
//! named ports to an external driver, and optionally records a VCD trace.
//!
//! # Architecture
//!
//! A model declares its ports once with [`port_registry!`], producing a
//! [`PortRegistry`] of typed accessors. The [`SignalBridge`] resolves
//! `prep` writes and builds [`Snapshot`]s through that registry. The
//! [`ClockSequencer`] owns the tick count and runs each period as three
//! evaluations (settle, rising edge, falling edge), dumping a trace frame
//! after each at strictly increasing times. [`Simulation`] ties these
//! together with single-owner lifetime; [`Harness`] wraps it in the plain
//! `init`/`prep`/`tick`/`finish` protocol with runtime ordering checks.
//!
//! # Usage
//!
//! ```
//! use vpw_sim::{port_registry, SimModel, SimOptions, Simulation};
//!
//! #[derive(Default)]
//! struct Register {
//!     clk: u8,
//!     d: u16,
//!     q: u16,
//! }
//!
//! port_registry!(Register {
//!     clock clk: u8,
//!     input d: u16,
//!     output q: u16,
//! });
//!
//! impl SimModel for Register {
//!     fn eval(&mut self) {
//!         if self.clk == 1 {
//!             self.q = self.d;
//!         }
//!     }
//! }
//!
//! let mut sim = Simulation::init(Register::default(), &SimOptions::default()).unwrap();
//! sim.prep("d", &[42]).unwrap();
//! sim.tick().unwrap();
//! assert_eq!(sim.tick().unwrap()["q"], 42u64);
//! sim.finish().unwrap();
//! ```
//!
//! # Modules
//!
//! - `error`: harness error type
//! - `ports`: port registry and the `port_registry!` macro
//! - `model`: the `SimModel` contract
//! - `bridge`: `prep` and `update`
//! - `time`: tick count and trace offsets
//! - `clock`: the clock sequencer
//! - `waveform`: trace recorder trait and VCD output
//! - `simulation`: the simulation context
//! - `harness`: the lifecycle-checked façade
//! - `testbench`: per-tick background agents

#![warn(missing_docs)]

pub mod bridge;
pub mod clock;
pub mod error;
pub mod harness;
pub mod model;
pub mod ports;
pub mod simulation;
pub mod snapshot;
pub mod testbench;
pub mod time;
pub mod waveform;

#[doc(hidden)]
pub use vpw_common;

pub use bridge::{SignalBridge, SnapshotScope};
pub use clock::ClockSequencer;
pub use error::SimError;
pub use harness::Harness;
pub use model::SimModel;
pub use ports::{Port, PortRegistry, Ports, Reader, RegistryBuilder, Writer};
pub use simulation::{SimOptions, Simulation};
pub use snapshot::Snapshot;
pub use testbench::{Agent, AgentStatus, Drive, Testbench};
pub use time::{ClockSchedule, Phase, TickCount};
pub use waveform::{TraceRecorder, TraceVar, VcdRecorder};

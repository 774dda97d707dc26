//! Shared foundational types used across the vpw simulation harness.
//!
//! This crate provides port widths and directions, the values read back from
//! a simulation model, multi-word packing helpers for wide buses, and the
//! trace timescale.

#![warn(missing_docs)]

pub mod pack;
pub mod port;
pub mod timescale;
pub mod value;

pub use pack::{pack, unpack, PackError, MAX_PACK_BITS, WORD_BITS};
pub use port::{Direction, PortWidth};
pub use timescale::{ParseTimescaleError, TimeUnit, Timescale};
pub use value::SignalValue;

//! Port discovery from Verilator model headers.
//!
//! A Verilator-generated `V<module>.h` declares each top-level port with a
//! `VL_IN*`, `VL_OUT*` or `VL_INOUT*` macro. [`parse_header`] collects
//! those declarations into a [`ParsedHeader`], setting the clock apart,
//! and [`render_registry`] turns the result into a Rust model struct with
//! its `port_registry!` declaration.

#![warn(missing_docs)]

pub mod codegen;
pub mod error;
pub mod parser;

pub use codegen::render_registry;
pub use error::HeaderError;
pub use parser::{is_identifier, parse_header, read_header, ParsedHeader, PortSpec};

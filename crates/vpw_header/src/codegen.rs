//! Rust source generation for a parsed header.
//!
//! The output is a model struct with one public field per port plus the
//! `port_registry!` declaration for it. The caller supplies the
//! `SimModel` implementation.

use std::fmt::{self, Write};

use vpw_common::{Direction, PortWidth};

use crate::error::HeaderError;
use crate::parser::{is_identifier, ParsedHeader, PortSpec};

/// Renders the struct and registry declaration for `model`.
///
/// Fails if `model` is not an identifier or the header has no ports.
pub fn render_registry(model: &str, header: &ParsedHeader) -> Result<String, HeaderError> {
    if !is_identifier(model) {
        return Err(HeaderError::InvalidModelName {
            name: model.to_string(),
        });
    }
    if header.ports.is_empty() && header.clock.is_none() {
        return Err(HeaderError::NoPorts);
    }
    let mut out = String::new();
    write_source(&mut out, model, header)?;
    Ok(out)
}

fn write_source(out: &mut impl Write, model: &str, header: &ParsedHeader) -> fmt::Result {
    writeln!(out, "// Generated by vpw from the {model} model header.")?;
    writeln!(out)?;
    writeln!(out, "#[derive(Debug, Default)]")?;
    writeln!(out, "pub struct {model} {{")?;
    for port in header.all_ports() {
        writeln!(out, "    /// {} [{}:{}]", port.direction, port.msb, port.lsb)?;
        writeln!(out, "    pub {}: {},", port.name, port.width)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "vpw_sim::port_registry!({model} {{")?;
    for port in header.all_ports() {
        write_entry(out, port)?;
    }
    writeln!(out, "}});")
}

/// One registry line. The bit range is spelled out only when the signal
/// is narrower than its storage.
fn write_entry(out: &mut impl Write, port: &PortSpec) -> fmt::Result {
    let keyword = match port.direction {
        Direction::Clock => "clock",
        other => other.keyword(),
    };
    write!(out, "    {keyword} {}", port.name)?;
    if port.bits() != port.width.storage_bits() {
        write!(out, "[{}:{}]", port.msb, port.lsb)?;
    }
    match port.width {
        PortWidth::Wide { words } => writeln!(out, ": [u32; {words}],"),
        other => writeln!(out, ": {other},"),
    }
}

//! Line scanner for the `VL_IN*`/`VL_OUT*`/`VL_INOUT*` port macros.
//!
//! Verilator declares each top-level port as one macro line such as
//! `VL_IN8(rst,0,0);`, `VL_OUT(&dout,31,0);` or `VL_INW((&bus),127,0,4);`.
//! The name may be bare, prefixed with `&`, or wrapped as `(&name)`
//! depending on the Verilator version; all three spellings are accepted.

use std::path::Path;

use serde::Serialize;
use vpw_common::{Direction, PortWidth};
use vpw_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

use crate::error::HeaderError;

/// One port declared in a model header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    /// The port name as it appears on the model.
    pub name: String,
    /// Input, output, bidirectional, or the clock once designated.
    pub direction: Direction,
    /// Native storage on the model.
    pub width: PortWidth,
    /// Most significant bit index.
    pub msb: u32,
    /// Least significant bit index.
    pub lsb: u32,
}

impl PortSpec {
    /// Width of the signal in bits.
    pub fn bits(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

/// The ports discovered in a header, with the clock set apart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedHeader {
    /// Every port except the clock, in header order.
    pub ports: Vec<PortSpec>,
    /// The clock port, if the header declares it.
    pub clock: Option<PortSpec>,
}

impl ParsedHeader {
    /// Iterates all ports, clock first.
    pub fn all_ports(&self) -> impl Iterator<Item = &PortSpec> {
        self.clock.iter().chain(self.ports.iter())
    }

    /// Looks up a port by name, clock included.
    pub fn get(&self, name: &str) -> Option<&PortSpec> {
        self.all_ports().find(|p| p.name == name)
    }
}

enum Line {
    NotAPort,
    Port(PortSpec),
    Malformed(&'static str),
}

/// Reads and parses a header file. See [`parse_header`].
pub fn read_header(
    path: &Path,
    clock: &str,
    sink: &DiagnosticSink,
) -> Result<ParsedHeader, HeaderError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_header(&text, clock, sink))
}

/// Scans header text for port declarations.
///
/// Lines that start like a port macro but cannot be understood, and
/// repeated port names, emit `W004` and are skipped. The port named
/// `clock` is moved out of the port list; if absent, `W003` is emitted
/// listing the ports that were found.
pub fn parse_header(text: &str, clock: &str, sink: &DiagnosticSink) -> ParsedHeader {
    let mut ports: Vec<PortSpec> = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        match parse_line(line) {
            Line::NotAPort => {}
            Line::Port(spec) => {
                if ports.iter().any(|p| p.name == spec.name) {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::UNRECOGNIZED_PORT,
                            format!("duplicate port '{}' skipped.", spec.name),
                        )
                        .with_note(format!("line {}", lineno + 1)),
                    );
                    continue;
                }
                ports.push(spec);
            }
            Line::Malformed(reason) => {
                sink.emit(
                    Diagnostic::warning(
                        DiagnosticCode::UNRECOGNIZED_PORT,
                        format!("unrecognised port declaration skipped: {reason}."),
                    )
                    .with_note(format!("line {}: {}", lineno + 1, line.trim())),
                );
            }
        }
    }

    let clock_spec = match ports.iter().position(|p| p.name == clock) {
        Some(i) => {
            let mut spec = ports.remove(i);
            spec.direction = Direction::Clock;
            Some(spec)
        }
        None => {
            let available: Vec<&str> = ports.iter().map(|p| p.name.as_str()).collect();
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::CLOCK_NOT_FOUND,
                    format!("clock signal '{clock}' not in port list."),
                )
                .with_note(format!("available ports: {}", available.join(", "))),
            );
            None
        }
    };
    tracing::debug!(ports = ports.len(), clock = clock_spec.is_some(), "header parsed");
    ParsedHeader {
        ports,
        clock: clock_spec,
    }
}

fn parse_line(line: &str) -> Line {
    let Some(rest) = line.trim_start().strip_prefix("VL_") else {
        return Line::NotAPort;
    };
    let Some(open) = rest.find('(') else {
        return Line::NotAPort;
    };
    let (direction, width) = match &rest[..open] {
        "IN8" => (Direction::Input, Some(PortWidth::U8)),
        "IN16" => (Direction::Input, Some(PortWidth::U16)),
        "IN" => (Direction::Input, Some(PortWidth::U32)),
        "IN64" => (Direction::Input, Some(PortWidth::U64)),
        "INW" => (Direction::Input, None),
        "OUT8" => (Direction::Output, Some(PortWidth::U8)),
        "OUT16" => (Direction::Output, Some(PortWidth::U16)),
        "OUT" => (Direction::Output, Some(PortWidth::U32)),
        "OUT64" => (Direction::Output, Some(PortWidth::U64)),
        "OUTW" => (Direction::Output, None),
        "INOUT8" => (Direction::Inout, Some(PortWidth::U8)),
        "INOUT16" => (Direction::Inout, Some(PortWidth::U16)),
        "INOUT" => (Direction::Inout, Some(PortWidth::U32)),
        "INOUT64" => (Direction::Inout, Some(PortWidth::U64)),
        "INOUTW" => (Direction::Inout, None),
        // VL_SIG*, VL_MODULE and friends are not ports
        _ => return Line::NotAPort,
    };
    let args = &rest[open + 1..];
    let Some(close) = args.rfind(')') else {
        return Line::Malformed("missing closing parenthesis");
    };
    let mut fields = args[..close].split(',').map(str::trim);

    let name = fields
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| c == '(' || c == ')' || c == '&' || c.is_whitespace());
    if !is_identifier(name) {
        return Line::Malformed("invalid port name");
    }
    let (Some(msb), Some(lsb)) = (
        fields.next().and_then(|f| f.parse::<u32>().ok()),
        fields.next().and_then(|f| f.parse::<u32>().ok()),
    ) else {
        return Line::Malformed("invalid bit range");
    };
    if msb < lsb {
        return Line::Malformed("msb below lsb");
    }
    let width = match width {
        Some(w) => w,
        None => match fields.next().and_then(|f| f.parse::<usize>().ok()) {
            Some(words) if words > 0 => PortWidth::Wide { words },
            _ => return Line::Malformed("invalid word count"),
        },
    };
    Line::Port(PortSpec {
        name: name.to_string(),
        direction,
        width,
        msb,
        lsb,
    })
}

/// Returns `true` if `s` is a non-empty `[A-Za-z_][A-Za-z0-9_]*` name.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
